//! The `fastmath init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("fastmath.toml").exists() {
        println!("fastmath.toml already exists, skipping.");
    } else {
        std::fs::write("fastmath.toml", SAMPLE_CONFIG)?;
        println!("Created fastmath.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set your name in fastmath.toml");
    println!("  2. Run: fastmath play");
    println!("  3. Run: fastmath leaderboard --records fastmath-records");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# fastmath configuration

player = "Player"
records_dir = "./fastmath-records"

[engine]
# First stage of every run; factors go up to stage * 1.5.
start_stage = 8
# Seconds per question before penalties.
timer_seconds = 10.0
# How many recent products are kept out of rotation.
duplicate_protection = 25
# Recency weights decay by this factor on every correct answer.
weight_decay = 0.88
weight_strength = 4.0
# Each further wrong keystroke on a question costs this many times the last.
penalty_mult = 2.0
# Penalty base before any question has been answered.
default_penalty_seconds = 2.0
# Fix the question sequence (also settable with FASTMATH_SEED).
# seed = 42
"#;
