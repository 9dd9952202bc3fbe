//! Core data model types for fastmath.
//!
//! These are the records the engine hands to its host: the question being
//! asked, one result per resolved question, and the summary of a run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A multiplication fact `a × b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactorPair {
    pub a: u32,
    pub b: u32,
    pub product: u32,
}

impl FactorPair {
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            a,
            b,
            product: a * b,
        }
    }

    /// The same fact with its factors in the other order.
    pub fn swapped(self) -> Self {
        Self {
            a: self.b,
            b: self.a,
            product: self.product,
        }
    }

    /// The answer as the host expects it to be typed.
    pub fn answer(&self) -> String {
        self.product.to_string()
    }
}

impl fmt::Display for FactorPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.a, self.b)
    }
}

/// Outcome of a single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    /// 1-based position of the question in the run.
    pub question_number: u32,
    pub a: u32,
    pub b: u32,
    /// Stage the question was asked at.
    pub stage: u32,
    /// Wall-clock seconds from the question appearing to its resolution.
    pub time_taken_seconds: f64,
    /// Wrong keystrokes made on this question.
    pub mistakes: u32,
    /// `false` when the question timed out.
    pub success: bool,
}

/// Totals for a finished (or in-progress) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub correct_count: u32,
    pub total_time_true_seconds: f64,
    pub total_penalty_seconds: f64,
    pub final_stage: u32,
    /// Whether the run ended because a question ran out of time.
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub results: Vec<QuestionResult>,
}

impl RunSummary {
    pub(crate) fn new(start_stage: u32) -> Self {
        Self {
            correct_count: 0,
            total_time_true_seconds: 0.0,
            total_penalty_seconds: 0.0,
            final_stage: start_stage,
            timed_out: false,
            results: Vec::new(),
        }
    }

    /// True time plus penalty time.
    pub fn total_time_with_penalty(&self) -> f64 {
        self.total_time_true_seconds + self.total_penalty_seconds
    }

    /// Average true seconds per correct answer.
    pub fn avg_time_true(&self) -> f64 {
        self.total_time_true_seconds / self.correct_count.max(1) as f64
    }

    /// Average seconds per correct answer including penalties.
    pub fn avg_time_with_penalty(&self) -> f64 {
        self.total_time_with_penalty() / self.correct_count.max(1) as f64
    }

    /// Mistakes made across every question of the run.
    pub fn total_mistakes(&self) -> u32 {
        self.results.iter().map(|r| r.mistakes).sum()
    }
}
