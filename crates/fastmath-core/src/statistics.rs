//! Per-fact statistics over question results.
//!
//! Results are bucketed by `(a, b)` into a square grid so a teacher can see
//! which facts take longest or trip players up most often.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::QuestionResult;

/// Largest factor tracked by the default grid.
pub const DEFAULT_GRID_SIZE: u32 = 30;

/// Which figure a grid cell is coloured by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactMetric {
    /// Results with at least one wrong keystroke.
    MistakeCount,
    /// Results that timed out.
    IncorrectCount,
    Attempts,
    /// Percentage of attempts with at least one wrong keystroke.
    MistakeRate,
    /// Mean seconds per attempt.
    AvgTime,
    /// Total seconds spent on the fact.
    TotalTime,
}

impl FactMetric {
    pub const ALL: [FactMetric; 6] = [
        FactMetric::MistakeCount,
        FactMetric::IncorrectCount,
        FactMetric::Attempts,
        FactMetric::MistakeRate,
        FactMetric::AvgTime,
        FactMetric::TotalTime,
    ];

    /// Format a metric value for display.
    pub fn format_value(&self, value: f64) -> String {
        match self {
            FactMetric::MistakeRate => format!("{value:.1}%"),
            FactMetric::AvgTime | FactMetric::TotalTime => format!("{value:.3} s"),
            _ => format!("{value}"),
        }
    }
}

impl fmt::Display for FactMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactMetric::MistakeCount => write!(f, "mistake_count"),
            FactMetric::IncorrectCount => write!(f, "incorrect_count"),
            FactMetric::Attempts => write!(f, "attempts"),
            FactMetric::MistakeRate => write!(f, "mistake_rate"),
            FactMetric::AvgTime => write!(f, "avg_time"),
            FactMetric::TotalTime => write!(f, "total_time"),
        }
    }
}

impl FromStr for FactMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "mistake_count" | "mistakes" => Ok(FactMetric::MistakeCount),
            "incorrect_count" | "incorrect" => Ok(FactMetric::IncorrectCount),
            "attempts" => Ok(FactMetric::Attempts),
            "mistake_rate" => Ok(FactMetric::MistakeRate),
            "avg_time" => Ok(FactMetric::AvgTime),
            "total_time" => Ok(FactMetric::TotalTime),
            other => Err(format!("unknown metric: {other}")),
        }
    }
}

/// Counts for one `(a, b)` fact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FactCell {
    pub attempts: u32,
    pub with_mistakes: u32,
    pub incorrect: u32,
    pub time_sum: f64,
    pub time_observations: u32,
}

impl FactCell {
    pub fn mistake_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            100.0 * self.with_mistakes as f64 / self.attempts as f64
        }
    }

    pub fn avg_time(&self) -> f64 {
        if self.time_observations == 0 {
            0.0
        } else {
            self.time_sum / self.time_observations as f64
        }
    }

    pub fn value(&self, metric: FactMetric) -> f64 {
        match metric {
            FactMetric::MistakeCount => self.with_mistakes as f64,
            FactMetric::IncorrectCount => self.incorrect as f64,
            FactMetric::Attempts => self.attempts as f64,
            FactMetric::MistakeRate => self.mistake_rate(),
            FactMetric::AvgTime => self.avg_time(),
            FactMetric::TotalTime => self.time_sum,
        }
    }
}

/// Grid-wide totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GridOverview {
    pub cells_with_attempts: u32,
    pub total_attempts: u32,
    pub cells_with_mistakes: u32,
    pub cells_with_incorrect: u32,
    pub total_time: f64,
    pub time_observations: u32,
}

impl GridOverview {
    /// Mean seconds per observed attempt, `None` when nothing was timed.
    pub fn avg_time(&self) -> Option<f64> {
        (self.time_observations > 0).then(|| self.total_time / self.time_observations as f64)
    }
}

/// Square grid of [`FactCell`]s indexed by factor, 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactGrid {
    size: u32,
    cells: Vec<FactCell>,
}

impl Default for FactGrid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE)
    }
}

impl FactGrid {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            cells: vec![FactCell::default(); (size * size) as usize],
        }
    }

    /// Build a default-sized grid from results.
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a QuestionResult>) -> Self {
        let mut grid = Self::default();
        for r in results {
            grid.record(r);
        }
        grid
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Add one result; returns `false` when its factors fall outside the grid.
    pub fn record(&mut self, result: &QuestionResult) -> bool {
        let Some(idx) = self.index(result.a, result.b) else {
            return false;
        };
        let cell = &mut self.cells[idx];
        cell.attempts += 1;
        if result.mistakes > 0 {
            cell.with_mistakes += 1;
        }
        if !result.success {
            cell.incorrect += 1;
        }
        if result.time_taken_seconds.is_finite() {
            cell.time_sum += result.time_taken_seconds;
            cell.time_observations += 1;
        }
        true
    }

    pub fn cell(&self, a: u32, b: u32) -> Option<&FactCell> {
        self.index(a, b).map(|idx| &self.cells[idx])
    }

    /// Largest value of `metric` over all cells (zero for an empty grid).
    pub fn max_value(&self, metric: FactMetric) -> f64 {
        self.cells
            .iter()
            .map(|c| c.value(metric))
            .fold(0.0, f64::max)
    }

    pub fn overview(&self) -> GridOverview {
        let mut overview = GridOverview::default();
        for cell in &self.cells {
            overview.total_attempts += cell.attempts;
            overview.total_time += cell.time_sum;
            overview.time_observations += cell.time_observations;
            if cell.attempts > 0 {
                overview.cells_with_attempts += 1;
            }
            if cell.with_mistakes > 0 {
                overview.cells_with_mistakes += 1;
            }
            if cell.incorrect > 0 {
                overview.cells_with_incorrect += 1;
            }
        }
        overview
    }

    fn index(&self, a: u32, b: u32) -> Option<usize> {
        if a == 0 || b == 0 || a > self.size || b > self.size {
            return None;
        }
        Some(((a - 1) * self.size + (b - 1)) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(a: u32, b: u32, time: f64, mistakes: u32, success: bool) -> QuestionResult {
        QuestionResult {
            question_number: 1,
            a,
            b,
            stage: 8,
            time_taken_seconds: time,
            mistakes,
            success,
        }
    }

    #[test]
    fn metric_display_and_parse() {
        for metric in FactMetric::ALL {
            assert_eq!(metric.to_string().parse::<FactMetric>().unwrap(), metric);
        }
        assert_eq!("avg-time".parse::<FactMetric>().unwrap(), FactMetric::AvgTime);
        assert!("speed".parse::<FactMetric>().is_err());
    }

    #[test]
    fn cells_accumulate() {
        let results = vec![
            result(7, 8, 2.0, 0, true),
            result(7, 8, 4.0, 2, true),
            result(7, 8, 10.0, 1, false),
            result(8, 7, 1.0, 0, true),
        ];
        let grid = FactGrid::from_results(&results);

        let cell = grid.cell(7, 8).unwrap();
        assert_eq!(cell.attempts, 3);
        assert_eq!(cell.with_mistakes, 2);
        assert_eq!(cell.incorrect, 1);
        assert!((cell.avg_time() - 16.0 / 3.0).abs() < 1e-9);
        assert!((cell.mistake_rate() - 200.0 / 3.0).abs() < 1e-9);

        // Orientation matters: 8 × 7 is its own cell.
        assert_eq!(grid.cell(8, 7).unwrap().attempts, 1);
        assert_eq!(grid.max_value(FactMetric::Attempts), 3.0);
        assert_eq!(grid.max_value(FactMetric::TotalTime), 16.0);
    }

    #[test]
    fn out_of_range_results_are_skipped() {
        let mut grid = FactGrid::new(30);
        assert!(!grid.record(&result(31, 2, 1.0, 0, true)));
        assert!(!grid.record(&result(0, 2, 1.0, 0, true)));
        assert!(grid.record(&result(30, 30, 1.0, 0, true)));
        assert_eq!(grid.overview().total_attempts, 1);
        assert!(grid.cell(31, 1).is_none());
    }

    #[test]
    fn overview_totals() {
        let results = vec![
            result(2, 3, 1.0, 0, true),
            result(2, 3, 3.0, 1, true),
            result(4, 5, 2.0, 0, false),
        ];
        let overview = FactGrid::from_results(&results).overview();
        assert_eq!(overview.cells_with_attempts, 2);
        assert_eq!(overview.total_attempts, 3);
        assert_eq!(overview.cells_with_mistakes, 1);
        assert_eq!(overview.cells_with_incorrect, 1);
        assert_eq!(overview.avg_time(), Some(2.0));

        assert_eq!(FactGrid::default().overview().avg_time(), None);
    }

    #[test]
    fn metric_formatting() {
        assert_eq!(FactMetric::MistakeRate.format_value(12.345), "12.3%");
        assert_eq!(FactMetric::AvgTime.format_value(1.5), "1.500 s");
        assert_eq!(FactMetric::Attempts.format_value(4.0), "4");
    }
}
