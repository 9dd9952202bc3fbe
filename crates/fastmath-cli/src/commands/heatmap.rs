//! The `fastmath heatmap` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use fastmath_core::statistics::FactMetric;
use fastmath_report::html::{build_grid, write_heatmap, HeatmapOptions};
use fastmath_report::record::load_records;

pub fn execute(
    records_dir: PathBuf,
    metric: String,
    player: Option<String>,
    date: Option<String>,
    output: PathBuf,
) -> Result<()> {
    let metric: FactMetric = metric.parse().map_err(anyhow::Error::msg)?;
    let date = date
        .map(|d| {
            NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .with_context(|| format!("invalid date (expected YYYY-MM-DD): {d}"))
        })
        .transpose()?;

    let records = load_records(&records_dir)?;
    let options = HeatmapOptions {
        metric,
        player,
        date,
    };

    let overview = build_grid(&records, &options).overview();
    write_heatmap(&records, &options, &output)?;

    println!(
        "Heat-map ({metric}): {} facts, {} attempts",
        overview.cells_with_attempts, overview.total_attempts
    );
    eprintln!("HTML heat-map: {}", output.display());

    Ok(())
}
