//! Session tracker: one drill run from first question to summary.
//!
//! A session owns all run state (stage, recency weights, recent answers,
//! counters and results). The host asks for a question, feeds it the typed
//! value after every keystroke, and polls [`DrillSession::tick`] to detect
//! timeouts between keystrokes.
//!
//! Each question has a budget of `timer_seconds`. Wrong keystrokes cost a
//! penalty equal to the player's average time per correct answer so far,
//! doubled for every earlier mistake on the same question, and the penalty
//! comes straight off the remaining time. When the remaining time reaches
//! zero the question fails and the run is over.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::DrillError;
use crate::input::{classify, reject_keystroke, InputVerdict};
use crate::model::{FactorPair, QuestionResult, RunSummary};
use crate::selector::{build_candidates, PairSelector, ProductWeights, RecentAnswers};
use crate::traits::{Clock, SystemClock};

/// Correct answers needed (cumulative, since the run started) to leave
/// `stage`.
pub fn stage_threshold(stage: u32, start_stage: u32) -> u32 {
    (2 * stage - 1) * (stage - start_stage + 1)
}

/// Penalty for the next mistake on a question.
pub fn escalated_penalty(avg_seconds: f64, penalty_mult: f64, mistakes_so_far: u32) -> f64 {
    avg_seconds * penalty_mult.powi(mistakes_so_far as i32)
}

/// What the host should do with the latest keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputStatus {
    /// Still a valid prefix of the answer; keep typing.
    Pending,
    /// The answer is complete; ask for the next question.
    Correct,
    /// Wrong keystroke; it has been removed and a penalty applied.
    Incorrect,
    /// The question ran out of time and the run is over.
    Timeout,
}

/// Result of [`DrillSession::submit_input`].
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub status: InputStatus,
    /// Seconds left on the question, never negative.
    pub remaining_seconds: f64,
    /// The value the input field should now hold.
    pub input: String,
    /// Penalty charged by this keystroke.
    pub penalty_seconds: f64,
    /// Stage after this keystroke.
    pub stage: u32,
    /// Whether this keystroke moved the run to a new stage.
    pub stage_advanced: bool,
}

/// Timer state reported by [`DrillSession::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickStatus {
    /// Waiting for the host to ask for the next question.
    Idle,
    /// A question is being answered.
    Running { remaining_seconds: f64 },
    /// The question just ran out of time; the run has ended.
    TimedOut,
    /// The run had already ended.
    Ended,
}

#[derive(Debug, Clone, Copy)]
struct ActiveQuestion {
    pair: FactorPair,
    started: Duration,
    penalty_seconds: f64,
    mistakes: u32,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    InQuestion(ActiveQuestion),
    Ended,
}

/// A single drill run.
pub struct DrillSession {
    config: EngineConfig,
    selector: PairSelector,
    clock: Box<dyn Clock>,
    rng: ChaCha8Rng,
    stage: u32,
    recent: RecentAnswers,
    weights: ProductWeights,
    summary: RunSummary,
    phase: Phase,
}

impl std::fmt::Debug for DrillSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrillSession")
            .field("stage", &self.stage)
            .field("correct_count", &self.summary.correct_count)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl DrillSession {
    /// Start a run on the real clock.
    pub fn start_run(config: EngineConfig) -> Result<Self, DrillError> {
        Self::with_clock(config, SystemClock::new())
    }

    /// Start a run on the given clock.
    pub fn with_clock(config: EngineConfig, clock: impl Clock + 'static) -> Result<Self, DrillError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        tracing::debug!(
            start_stage = config.start_stage,
            seed = ?config.seed,
            "run started"
        );

        Ok(Self {
            selector: PairSelector::new(&config),
            clock: Box::new(clock),
            rng,
            stage: config.start_stage,
            recent: RecentAnswers::new(config.duplicate_protection),
            weights: ProductWeights::new(config.weight_decay, config.weight_floor),
            summary: RunSummary::new(config.start_stage),
            phase: Phase::Idle,
            config,
        })
    }

    /// Choose the next question and start its timer.
    pub fn next_question(&mut self) -> Result<FactorPair, DrillError> {
        match self.phase {
            Phase::Ended => return Err(DrillError::RunEnded),
            Phase::InQuestion(_) => {
                return Err(DrillError::QuestionInProgress {
                    question_number: self.question_number(),
                })
            }
            Phase::Idle => {}
        }

        let candidates = build_candidates(self.stage, self.config.stretch_mult);
        let degenerate = DrillError::DegenerateStage { stage: self.stage };

        let mut pair = self
            .selector
            .choose_pair(&candidates, &mut self.recent, &self.weights, &mut self.rng)
            .ok_or_else(|| degenerate.clone())?;
        let mut retries = 0;
        while self.recent.contains(pair.product) && retries < self.config.duplicate_retry_limit {
            pair = self
                .selector
                .choose_pair(&candidates, &mut self.recent, &self.weights, &mut self.rng)
                .ok_or_else(|| degenerate.clone())?;
            retries += 1;
        }
        if self.recent.contains(pair.product) {
            tracing::warn!(
                stage = self.stage,
                product = pair.product,
                "repeating a recent product"
            );
        }
        self.recent.push(pair.product);

        self.phase = Phase::InQuestion(ActiveQuestion {
            pair,
            started: self.clock.now(),
            penalty_seconds: 0.0,
            mistakes: 0,
        });

        tracing::debug!(
            question = self.question_number(),
            stage = self.stage,
            a = pair.a,
            b = pair.b,
            "question asked"
        );
        Ok(pair)
    }

    /// Feed the current contents of the answer field.
    pub fn submit_input(&mut self, typed: &str) -> Result<SubmitOutcome, DrillError> {
        let mut question = match self.phase {
            Phase::InQuestion(q) => q,
            Phase::Idle => return Err(DrillError::NoActiveQuestion),
            Phase::Ended => return Err(DrillError::RunEnded),
        };

        if self.remaining_for(&question) <= 0.0 {
            self.time_out(question);
            return Ok(self.outcome(InputStatus::Timeout, 0.0, typed.trim(), 0.0, false));
        }

        match classify(typed, &question.pair.answer()) {
            InputVerdict::Prefix => {
                let remaining = self.remaining_for(&question);
                Ok(self.outcome(InputStatus::Pending, remaining, typed.trim(), 0.0, false))
            }
            InputVerdict::Complete => {
                let remaining = self.remaining_for(&question);
                let advanced = self.complete(question);
                Ok(self.outcome(InputStatus::Correct, remaining, "", 0.0, advanced))
            }
            InputVerdict::Mistake => {
                let penalty = escalated_penalty(
                    self.average_seconds(),
                    self.config.penalty_mult,
                    question.mistakes,
                );
                question.mistakes += 1;
                question.penalty_seconds += penalty;
                self.summary.total_penalty_seconds += penalty;

                let corrected = reject_keystroke(typed);
                let remaining = self.remaining_for(&question);

                tracing::debug!(
                    question = self.question_number(),
                    mistakes = question.mistakes,
                    penalty,
                    remaining,
                    "wrong keystroke"
                );

                if remaining <= 0.0 {
                    self.time_out(question);
                    Ok(self.outcome(InputStatus::Timeout, 0.0, &corrected, penalty, false))
                } else {
                    self.phase = Phase::InQuestion(question);
                    Ok(self.outcome(InputStatus::Incorrect, remaining, &corrected, penalty, false))
                }
            }
        }
    }

    /// Recompute the timer and end the run if the question has expired.
    pub fn tick(&mut self) -> TickStatus {
        match self.phase {
            Phase::Idle => TickStatus::Idle,
            Phase::Ended => TickStatus::Ended,
            Phase::InQuestion(question) => {
                let remaining = self.remaining_for(&question);
                if remaining <= 0.0 {
                    self.time_out(question);
                    TickStatus::TimedOut
                } else {
                    TickStatus::Running {
                        remaining_seconds: remaining,
                    }
                }
            }
        }
    }

    /// Finish the run and hand back its summary.
    ///
    /// A question still awaiting an answer is discarded without a result.
    pub fn end_run(mut self) -> RunSummary {
        if let Phase::InQuestion(question) = self.phase {
            tracing::debug!(
                question = self.question_number(),
                product = question.pair.product,
                "discarding unanswered question"
            );
        }
        self.summary.final_stage = self.stage;
        tracing::info!(
            correct = self.summary.correct_count,
            stage = self.stage,
            timed_out = self.summary.timed_out,
            total_time = self.summary.total_time_with_penalty(),
            "run finished"
        );
        self.summary
    }

    /// Seconds left on the active question, if any.
    pub fn remaining_seconds(&self) -> Option<f64> {
        match &self.phase {
            Phase::InQuestion(q) => Some(self.remaining_for(q).max(0.0)),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<FactorPair> {
        match &self.phase {
            Phase::InQuestion(q) => Some(q.pair),
            _ => None,
        }
    }

    /// Wrong keystrokes on the active question.
    pub fn mistakes_this_question(&self) -> u32 {
        match &self.phase {
            Phase::InQuestion(q) => q.mistakes,
            _ => 0,
        }
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn correct_count(&self) -> u32 {
        self.summary.correct_count
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended)
    }

    /// Run totals so far.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn recent_answers(&self) -> &RecentAnswers {
        &self.recent
    }

    pub fn product_weights(&self) -> &ProductWeights {
        &self.weights
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn question_number(&self) -> u32 {
        self.summary.correct_count + 1
    }

    fn remaining_for(&self, question: &ActiveQuestion) -> f64 {
        self.config.timer_seconds
            - self.clock.seconds_since(question.started)
            - question.penalty_seconds
    }

    /// Average seconds per correct answer, penalties included.
    fn average_seconds(&self) -> f64 {
        if self.summary.correct_count == 0 {
            return self.config.default_penalty_seconds;
        }
        let avg = self.summary.total_time_with_penalty() / self.summary.correct_count as f64;
        if avg.is_finite() && avg > 0.0 {
            avg
        } else {
            self.config.default_penalty_seconds
        }
    }

    /// Record a correct answer; returns whether the stage advanced.
    fn complete(&mut self, question: ActiveQuestion) -> bool {
        let time_taken = self.clock.seconds_since(question.started);
        let stage = self.stage;

        self.summary.correct_count += 1;
        self.summary.total_time_true_seconds += time_taken;
        self.summary.results.push(QuestionResult {
            question_number: self.summary.correct_count,
            a: question.pair.a,
            b: question.pair.b,
            stage,
            time_taken_seconds: time_taken,
            mistakes: question.mistakes,
            success: true,
        });
        self.weights.decay_and_bump(question.pair.product);

        let advanced =
            self.summary.correct_count >= stage_threshold(stage, self.config.start_stage);
        if advanced {
            self.stage += 1;
            self.summary.final_stage = self.stage;
            tracing::debug!(
                stage = self.stage,
                correct = self.summary.correct_count,
                "stage advanced"
            );
        }

        self.phase = Phase::Idle;
        advanced
    }

    fn time_out(&mut self, question: ActiveQuestion) {
        let time_taken = self.clock.seconds_since(question.started);
        self.summary.total_time_true_seconds += time_taken;
        self.summary.results.push(QuestionResult {
            question_number: self.question_number(),
            a: question.pair.a,
            b: question.pair.b,
            stage: self.stage,
            time_taken_seconds: time_taken,
            mistakes: question.mistakes,
            success: false,
        });
        self.summary.timed_out = true;
        self.summary.final_stage = self.stage;
        self.phase = Phase::Ended;

        tracing::debug!(
            question = self.question_number(),
            mistakes = question.mistakes,
            "question timed out"
        );
    }

    fn outcome(
        &self,
        status: InputStatus,
        remaining: f64,
        input: &str,
        penalty: f64,
        stage_advanced: bool,
    ) -> SubmitOutcome {
        SubmitOutcome {
            status,
            remaining_seconds: remaining.max(0.0),
            input: input.to_string(),
            penalty_seconds: penalty,
            stage: self.stage,
            stage_advanced,
        }
    }
}
