//! The `fastmath simulate` command.
//!
//! Drives the engine with a scripted player on a manual clock, so runs are
//! fast and reproducible under a seed.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use fastmath_core::traits::ManualClock;
use fastmath_core::{DrillSession, FactorPair, InputStatus, RunSummary};
use fastmath_report::record::{Player, RunRecord};

/// Seconds between simulated keystrokes.
const KEYSTROKE_SECONDS: f64 = 0.12;

/// Mixed into the seed so the player's dice differ from the engine's.
const PLAYER_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// A player that thinks for a while, then types the answer with the odd slip.
struct SimulatedPlayer {
    rng: ChaCha8Rng,
    accuracy: f64,
    think_time: f64,
}

impl SimulatedPlayer {
    fn new(seed: Option<u64>, accuracy: f64, think_time: f64) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s ^ PLAYER_SEED_SALT),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            rng,
            accuracy,
            think_time,
        }
    }

    /// Answer the active question. Returns `false` once the run has timed out.
    fn answer(
        &mut self,
        session: &mut DrillSession,
        clock: &ManualClock,
        pair: FactorPair,
    ) -> Result<bool> {
        clock.advance_secs(self.think_time * self.rng.gen_range(0.5..1.5));

        let mut field = String::new();
        for expected in pair.answer().chars() {
            if !self.rng.gen_bool(self.accuracy) {
                field.push(self.wrong_digit(expected));
                let outcome = session.submit_input(&field)?;
                if outcome.status == InputStatus::Timeout {
                    return Ok(false);
                }
                field = outcome.input;
                clock.advance_secs(KEYSTROKE_SECONDS);
            }

            field.push(expected);
            let outcome = session.submit_input(&field)?;
            match outcome.status {
                InputStatus::Correct => return Ok(true),
                InputStatus::Timeout => return Ok(false),
                InputStatus::Pending | InputStatus::Incorrect => field = outcome.input,
            }
            clock.advance_secs(KEYSTROKE_SECONDS);
        }

        // The full answer always completes the question.
        Ok(!session.is_ended())
    }

    fn wrong_digit(&mut self, expected: char) -> char {
        let digit = expected.to_digit(10).unwrap_or(0);
        let offset = self.rng.gen_range(1..10);
        char::from_digit((digit + offset) % 10, 10).unwrap_or('0')
    }
}

/// Play one simulated run to its end.
fn simulate_run(
    engine: fastmath_core::EngineConfig,
    player: &mut SimulatedPlayer,
    max_questions: u32,
) -> Result<RunSummary> {
    let clock = ManualClock::new();
    let mut session = DrillSession::with_clock(engine, clock.clone())?;

    while session.correct_count() < max_questions {
        let pair = session.next_question()?;
        if !player.answer(&mut session, &clock, pair)? {
            break;
        }
    }

    Ok(session.end_run())
}

#[allow(clippy::too_many_arguments)]
pub fn execute(
    runs: u32,
    accuracy: f64,
    think_time: f64,
    max_questions: u32,
    seed: Option<u64>,
    player_name: String,
    config_path: Option<PathBuf>,
    records: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(runs >= 1, "runs must be at least 1");
    anyhow::ensure!(
        (0.0..=1.0).contains(&accuracy),
        "accuracy must be between 0 and 1"
    );
    anyhow::ensure!(
        think_time.is_finite() && think_time >= 0.0,
        "think-time must be zero or more seconds"
    );

    let config = super::load_with_overrides(config_path.as_deref(), records, seed)?;
    let base_seed = config.engine.seed;

    let mut table = Table::new();
    table.set_header(vec![
        "Run", "Correct", "Stage", "Mistakes", "Penalty", "Total", "Avg", "Ended by",
    ]);

    for run in 0..runs {
        let run_seed = base_seed.map(|s| s.wrapping_add(run as u64));
        let mut engine = config.engine.clone();
        engine.seed = run_seed;
        let mut player = SimulatedPlayer::new(run_seed, accuracy, think_time);

        let summary = simulate_run(engine, &mut player, max_questions)?;
        tracing::debug!(run, correct = summary.correct_count, "simulated run done");

        table.add_row(vec![
            Cell::new(run + 1),
            Cell::new(summary.correct_count),
            Cell::new(summary.final_stage),
            Cell::new(summary.total_mistakes()),
            Cell::new(format!("{:.2} s", summary.total_penalty_seconds)),
            Cell::new(format!("{:.2} s", summary.total_time_with_penalty())),
            Cell::new(format!("{:.3} s", summary.avg_time_with_penalty())),
            Cell::new(if summary.timed_out { "timeout" } else { "limit" }),
        ]);

        let record = RunRecord::new(Player::new(player_name.clone()), summary);
        record.save_in_dir(&config.records_dir)?;
    }

    println!("{table}");
    eprintln!("Records saved to: {}", config.records_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastmath_core::EngineConfig;

    fn engine(seed: u64) -> EngineConfig {
        EngineConfig {
            seed: Some(seed),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn perfect_player_reaches_the_limit() {
        let mut player = SimulatedPlayer::new(Some(1), 1.0, 1.0);
        let summary = simulate_run(engine(1), &mut player, 30).unwrap();

        assert_eq!(summary.correct_count, 30);
        assert!(!summary.timed_out);
        assert_eq!(summary.total_mistakes(), 0);
        assert_eq!(summary.final_stage, 9);
        assert_eq!(summary.results.len(), 30);
    }

    #[test]
    fn slow_player_times_out_first_question() {
        let mut player = SimulatedPlayer::new(Some(2), 1.0, 30.0);
        let summary = simulate_run(engine(2), &mut player, 30).unwrap();

        assert!(summary.timed_out);
        assert_eq!(summary.correct_count, 0);
        assert_eq!(summary.results.len(), 1);
        assert!(!summary.results[0].success);
    }

    #[test]
    fn careless_player_pays_penalties() {
        let mut player = SimulatedPlayer::new(Some(3), 0.0, 0.5);
        let summary = simulate_run(engine(3), &mut player, 50).unwrap();

        // Every keystroke starts with a slip, so penalties pile up until a
        // question runs out of time.
        assert!(summary.timed_out);
        assert!(summary.total_penalty_seconds > 0.0);
        assert!(summary.total_mistakes() > 0);
    }

    #[test]
    fn same_seed_same_run() {
        let a = simulate_run(engine(9), &mut SimulatedPlayer::new(Some(9), 0.9, 1.5), 100).unwrap();
        let b = simulate_run(engine(9), &mut SimulatedPlayer::new(Some(9), 0.9, 1.5), 100).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn wrong_digit_is_never_the_expected_one() {
        let mut player = SimulatedPlayer::new(Some(4), 0.5, 1.0);
        for expected in '0'..='9' {
            for _ in 0..20 {
                let wrong = player.wrong_digit(expected);
                assert_ne!(wrong, expected);
                assert!(wrong.is_ascii_digit());
            }
        }
    }
}
