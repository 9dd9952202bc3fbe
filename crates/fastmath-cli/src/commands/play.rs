//! The `fastmath play` command.
//!
//! A line-based terminal host. Each typed line is fed to the engine one
//! character at a time as a growing answer field, so every wrong keystroke
//! is penalised and trimmed on its own.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use fastmath_core::{DrillSession, InputStatus, TickStatus};
use fastmath_report::record::{Player, RunRecord};

/// Lines that end the run early.
const QUIT_WORDS: [&str; 2] = ["q", "quit"];

#[derive(Debug, PartialEq)]
enum LineResult {
    /// The question is still open; keep prompting.
    Open(String),
    Correct,
    TimedOut,
}

pub fn execute(
    player: Option<String>,
    teacher: bool,
    student: bool,
    config_path: Option<PathBuf>,
    records: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let config = super::load_with_overrides(config_path.as_deref(), records, seed)?;
    let player = Player {
        name: player.unwrap_or_else(|| config.player.clone()),
        is_teacher: teacher,
        is_student: student,
    };

    let mut session = DrillSession::start_run(config.engine.clone())?;
    println!(
        "fastmath: answer as fast as you can. {:.0} s per question, wrong digits cost time. Type q to stop.",
        config.engine.timer_seconds
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    'questions: loop {
        let pair = session.next_question()?;
        let mut field = String::new();

        loop {
            prompt(&format!(
                "[stage {}] Q{}  {pair} = {field}",
                session.stage(),
                session.correct_count() + 1
            ))?;

            let Some(line) = lines.next() else {
                break 'questions;
            };
            let line = line.context("failed to read from stdin")?;
            let typed = line.trim();
            if QUIT_WORDS.contains(&typed) {
                break 'questions;
            }

            if let TickStatus::TimedOut = session.tick() {
                println!("Time's up! {pair} = {}", pair.product);
                break 'questions;
            }

            match feed_line(&mut session, field, typed)? {
                LineResult::Open(rest) => {
                    if let Some(remaining) = session.remaining_seconds() {
                        println!("  {remaining:.1} s left");
                    }
                    field = rest;
                }
                LineResult::Correct => {
                    println!("  correct");
                    break;
                }
                LineResult::TimedOut => {
                    println!("Time's up! {pair} = {}", pair.product);
                    break 'questions;
                }
            }
        }
    }

    let summary = session.end_run();
    println!("\n{}", super::summary_table(&summary));

    let record = RunRecord::new(player, summary);
    let path = record.save_in_dir(&config.records_dir)?;
    eprintln!("Run saved to: {}", path.display());

    Ok(())
}

/// Type `typed` onto the current field one keystroke at a time.
fn feed_line(session: &mut DrillSession, mut field: String, typed: &str) -> Result<LineResult> {
    for ch in typed.chars() {
        field.push(ch);
        let outcome = session.submit_input(&field)?;
        match outcome.status {
            InputStatus::Pending => field = outcome.input,
            InputStatus::Incorrect => {
                println!(
                    "  wrong digit '{ch}': -{:.2} s ({:.1} s left)",
                    outcome.penalty_seconds, outcome.remaining_seconds
                );
                field = outcome.input;
            }
            InputStatus::Correct => {
                if outcome.stage_advanced {
                    println!("  stage up! now at stage {}", outcome.stage);
                }
                return Ok(LineResult::Correct);
            }
            InputStatus::Timeout => return Ok(LineResult::TimedOut),
        }
    }
    Ok(LineResult::Open(field))
}

fn prompt(text: &str) -> Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastmath_core::traits::ManualClock;
    use fastmath_core::EngineConfig;

    fn session(config: EngineConfig) -> (DrillSession, ManualClock) {
        let clock = ManualClock::new();
        let session = DrillSession::with_clock(config, clock.clone()).unwrap();
        (session, clock)
    }

    fn seeded(seed: u64) -> EngineConfig {
        EngineConfig {
            seed: Some(seed),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn typed_answer_completes_question() {
        let (mut s, clock) = session(seeded(1));
        let pair = s.next_question().unwrap();
        clock.advance_secs(1.0);

        let result = feed_line(&mut s, String::new(), &pair.answer()).unwrap();
        assert_eq!(result, LineResult::Correct);
        assert_eq!(s.correct_count(), 1);
        assert_eq!(s.summary().total_penalty_seconds, 0.0);
    }

    #[test]
    fn wrong_digit_is_trimmed_and_charged() {
        let (mut s, _clock) = session(seeded(2));
        let pair = s.next_question().unwrap();

        let result = feed_line(&mut s, String::new(), "x").unwrap();
        assert_eq!(result, LineResult::Open(String::new()));
        assert_eq!(s.mistakes_this_question(), 1);
        assert!((s.summary().total_penalty_seconds - 2.0).abs() < 1e-9);

        // A slip inside a line is dropped and typing carries on.
        let line = format!("x{}", pair.answer());
        let result = feed_line(&mut s, String::new(), &line).unwrap();
        assert_eq!(result, LineResult::Correct);
        assert_eq!(s.summary().results[0].mistakes, 2);
        assert!((s.summary().total_penalty_seconds - 6.0).abs() < 1e-9);
    }

    #[test]
    fn prefix_keeps_question_open() {
        let (mut s, _clock) = session(seeded(3));
        let pair = s.next_question().unwrap();
        let answer = pair.answer();
        let partial = &answer[..answer.len() - 1];

        let result = feed_line(&mut s, String::new(), partial).unwrap();
        assert_eq!(result, LineResult::Open(partial.to_string()));
        assert_eq!(s.current_question(), Some(pair));
    }

    #[test]
    fn correct_answer_can_advance_stage() {
        // From stage 1 a single correct answer meets the threshold.
        let config = EngineConfig {
            start_stage: 1,
            ..seeded(4)
        };
        let (mut s, _clock) = session(config);
        let pair = s.next_question().unwrap();

        let result = feed_line(&mut s, String::new(), &pair.answer()).unwrap();
        assert_eq!(result, LineResult::Correct);
        assert_eq!(s.stage(), 2);
    }

    #[test]
    fn repeated_mistakes_time_out() {
        let (mut s, _clock) = session(seeded(5));
        s.next_question().unwrap();

        // Penalties of 2, 4 and 8 seconds exhaust a 10 second timer.
        let result = feed_line(&mut s, String::new(), "xxx").unwrap();
        assert_eq!(result, LineResult::TimedOut);
        assert!(s.is_ended());
        assert!(s.summary().timed_out);
    }

    #[test]
    fn slow_line_times_out() {
        let (mut s, clock) = session(seeded(6));
        let pair = s.next_question().unwrap();
        clock.advance_secs(10.5);

        let result = feed_line(&mut s, String::new(), &pair.answer()).unwrap();
        assert_eq!(result, LineResult::TimedOut);
        assert_eq!(s.correct_count(), 0);
        assert_eq!(s.summary().results.len(), 1);
    }
}
