//! HTML heat-map generator.
//!
//! Produces a self-contained HTML file with the CSS inlined: one table cell
//! per `(a, b)` fact, coloured by the chosen [`FactMetric`].

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;

use fastmath_core::statistics::{FactGrid, FactMetric};

use crate::record::RunRecord;

type Rgb = (u8, u8, u8);

const RAMP_LOW: Rgb = (0x10, 0x10, 0x15);
const RAMP_MID: Rgb = (0xff, 0xd2, 0xd2);
const RAMP_HIGH: Rgb = (0xff, 0x3b, 0x30);

/// Which records feed the heat-map and how cells are coloured.
#[derive(Debug, Clone)]
pub struct HeatmapOptions {
    pub metric: FactMetric,
    /// Only runs by this player (case-insensitive).
    pub player: Option<String>,
    /// Only runs created on this UTC date.
    pub date: Option<NaiveDate>,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            metric: FactMetric::MistakeCount,
            player: None,
            date: None,
        }
    }
}

impl HeatmapOptions {
    fn matches(&self, record: &RunRecord) -> bool {
        if let Some(player) = &self.player {
            if !record
                .player
                .name
                .trim()
                .eq_ignore_ascii_case(player.trim())
            {
                return false;
            }
        }
        if let Some(date) = self.date {
            if record.created_at.date_naive() != date {
                return false;
            }
        }
        true
    }
}

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn lerp_rgb(from: Rgb, to: Rgb, t: f64) -> Rgb {
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    (mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// Colour for `value` on a dark-to-pink-to-red ramp scaled to `max`.
pub fn color_for(value: f64, max: f64) -> String {
    let (r, g, b) = if max <= 0.0 || !value.is_finite() {
        RAMP_LOW
    } else {
        let t = (value / max).clamp(0.0, 1.0);
        if t < 0.5 {
            lerp_rgb(RAMP_LOW, RAMP_MID, t / 0.5)
        } else {
            lerp_rgb(RAMP_MID, RAMP_HIGH, (t - 0.5) / 0.5)
        }
    };
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Aggregate the results of every record the options select.
pub fn build_grid(records: &[RunRecord], options: &HeatmapOptions) -> FactGrid {
    FactGrid::from_results(
        records
            .iter()
            .filter(|r| options.matches(r))
            .flat_map(|r| r.summary.results.iter()),
    )
}

/// Generate the heat-map page.
pub fn generate_heatmap_html(records: &[RunRecord], options: &HeatmapOptions) -> String {
    let grid = build_grid(records, options);
    let metric = options.metric;
    let max = grid.max_value(metric);
    let runs = records.iter().filter(|r| options.matches(r)).count();

    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>fastmath heat-map: {metric}</title>\n"));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>fastmath heat-map</h1>\n");
    let player = options
        .player
        .as_deref()
        .map(html_escape)
        .unwrap_or_else(|| "all players".to_string());
    let date = options
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "all dates".to_string());
    html.push_str(&format!(
        "<p class=\"meta\">Metric: <strong>{metric}</strong> | {player} | {date} | {runs} runs</p>\n"
    ));
    html.push_str(&format!(
        "<p class=\"legend\"><span class=\"swatch\" style=\"background:{}\"></span> 0 \
         <span class=\"swatch\" style=\"background:{}\"></span> max {}</p>\n",
        color_for(0.0, max),
        color_for(max, max),
        metric.format_value(max)
    ));
    html.push_str("</header>\n");

    // Grid: rows are the first factor, columns the second.
    html.push_str("<table class=\"grid\">\n<thead><tr><th>×</th>");
    for b in 1..=grid.size() {
        html.push_str(&format!("<th>{b}</th>"));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for a in 1..=grid.size() {
        html.push_str(&format!("<tr><th>{a}</th>"));
        for b in 1..=grid.size() {
            let cell = grid.cell(a, b).copied().unwrap_or_default();
            let value = cell.value(metric);
            html.push_str(&format!(
                "<td style=\"background:{}\" title=\"{a} × {b} = {}&#10;attempts: {}&#10;with mistakes: {}&#10;incorrect: {}&#10;avg time: {}\"></td>",
                color_for(value, max),
                a * b,
                cell.attempts,
                cell.with_mistakes,
                cell.incorrect,
                FactMetric::AvgTime.format_value(cell.avg_time()),
            ));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody></table>\n");

    // Overall statistics
    let overview = grid.overview();
    let avg = overview
        .avg_time()
        .map(|t| format!("{t:.3} s"))
        .unwrap_or_else(|| "-".to_string());
    html.push_str(&format!(
        "<p class=\"stats\">Cells with attempts: {} | Total attempts: {} | \
         Cells with mistakes: {} | Cells with incorrect: {} | \
         Avg time (overall): {avg} | Total time (overall): {:.3} s</p>\n",
        overview.cells_with_attempts,
        overview.total_attempts,
        overview.cells_with_mistakes,
        overview.cells_with_incorrect,
        overview.total_time,
    ));

    html.push_str("</body>\n</html>");
    html
}

/// Write the heat-map page to a file.
pub fn write_heatmap(records: &[RunRecord], options: &HeatmapOptions, path: &Path) -> Result<()> {
    let html = generate_heatmap_html(records, options);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write heat-map to {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #0b0b0f; --fg: #f3f4f6; --border: #26262e; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
.meta, .stats { color: #9ca3af; }
.legend { display: flex; align-items: center; gap: 0.5rem; }
.swatch { display: inline-block; width: 1rem; height: 1rem; border: 1px solid var(--border); }
table.grid { border-collapse: collapse; margin: 1rem 0; }
table.grid th { font-size: 0.7rem; padding: 0 0.25rem; color: #9ca3af; }
table.grid td { width: 1.2rem; height: 1.2rem; border: 1px solid var(--border); }
"#;
