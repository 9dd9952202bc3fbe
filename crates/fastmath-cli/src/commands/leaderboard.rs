//! The `fastmath leaderboard` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Table};

use fastmath_report::leaderboard::{Leaderboard, Period, Scope};
use fastmath_report::record::load_records;

pub fn execute(
    records_dir: PathBuf,
    scope: String,
    period: String,
    limit: usize,
    format: String,
) -> Result<()> {
    let scope: Scope = scope.parse().map_err(anyhow::Error::msg)?;
    let period: Period = period.parse().map_err(anyhow::Error::msg)?;

    let records = load_records(&records_dir)?;
    let board = Leaderboard::build(&records, period, Utc::now());
    let rows: Vec<_> = board.filtered(scope).into_iter().take(limit).collect();

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        "text" => {
            let counts = board.role_counts();
            let count = |role: Scope| counts.get(&role).copied().unwrap_or(0);
            println!(
                "Leaderboard ({scope}, {period}): {} players ({} students, {} teachers)",
                rows.len(),
                count(Scope::Students),
                count(Scope::Teachers)
            );
            if rows.is_empty() {
                println!("No runs recorded for this board.");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_header(vec![
                "#", "Player", "Questions", "Total time", "Penalty", "Stage", "Date",
            ]);
            for (rank, entry) in rows.iter().enumerate() {
                table.add_row(vec![
                    Cell::new(rank + 1),
                    Cell::new(&entry.player),
                    Cell::new(entry.questions_answered),
                    Cell::new(format!("{:.2} s", entry.total_time_seconds)),
                    Cell::new(format!("{:.2} s", entry.penalty_seconds)),
                    Cell::new(entry.stage_reached),
                    Cell::new(entry.created_at.format("%Y-%m-%d")),
                ]);
            }
            println!("{table}");

            if let Some(top) = board.top_student() {
                println!(
                    "Top student: {} ({} questions)",
                    top.player, top.questions_answered
                );
            }
        }
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    Ok(())
}
