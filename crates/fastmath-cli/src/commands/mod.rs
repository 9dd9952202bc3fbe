pub mod heatmap;
pub mod init;
pub mod leaderboard;
pub mod play;
pub mod simulate;

use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{Cell, Table};

use fastmath_core::config::{load_config_from, FastmathConfig};
use fastmath_core::RunSummary;

/// Load config and apply command-line overrides shared by `play` and `simulate`.
fn load_with_overrides(
    config_path: Option<&Path>,
    records: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<FastmathConfig> {
    let mut config = load_config_from(config_path)?;
    if let Some(records) = records {
        config.records_dir = records;
    }
    if seed.is_some() {
        config.engine.seed = seed;
    }
    Ok(config)
}

/// End-of-run figures as a table.
fn summary_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Figure", "Value"]);
    let rows = [
        ("Questions answered", summary.correct_count.to_string()),
        ("Stage reached", summary.final_stage.to_string()),
        (
            "True time",
            format!("{:.2} s", summary.total_time_true_seconds),
        ),
        (
            "Penalty time",
            format!("{:.2} s", summary.total_penalty_seconds),
        ),
        (
            "Total time",
            format!("{:.2} s", summary.total_time_with_penalty()),
        ),
        (
            "Avg time (true)",
            format!("{:.3} s", summary.avg_time_true()),
        ),
        (
            "Avg time (with penalty)",
            format!("{:.3} s", summary.avg_time_with_penalty()),
        ),
        ("Mistakes", summary.total_mistakes().to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    table
}
