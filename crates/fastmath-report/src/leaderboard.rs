//! Best-per-player leaderboard over run records.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::record::RunRecord;

/// Which players a board shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    All,
    Students,
    Teachers,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => write!(f, "all"),
            Scope::Students => write!(f, "students"),
            Scope::Teachers => write!(f, "teachers"),
        }
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Scope::All),
            "students" | "student" => Ok(Scope::Students),
            "teachers" | "teacher" => Ok(Scope::Teachers),
            other => Err(format!("unknown scope: {other}")),
        }
    }
}

/// Time window a board covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    AllTime,
    Monthly,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::AllTime => write!(f, "alltime"),
            Period::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "alltime" | "all" => Ok(Period::AllTime),
            "monthly" | "month" => Ok(Period::Monthly),
            other => Err(format!("unknown period: {other}")),
        }
    }
}

impl Period {
    /// Whether a run created at `at` belongs in this period relative to `now`.
    pub fn includes(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Period::AllTime => true,
            Period::Monthly => at.year() == now.year() && at.month() == now.month(),
        }
    }
}

/// One row on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player: String,
    pub questions_answered: u32,
    /// True time plus penalties, in seconds.
    pub total_time_seconds: f64,
    pub penalty_seconds: f64,
    pub stage_reached: u32,
    pub created_at: DateTime<Utc>,
    pub is_teacher: bool,
    pub is_student: bool,
}

impl From<&RunRecord> for LeaderboardEntry {
    fn from(record: &RunRecord) -> Self {
        let summary = &record.summary;
        Self {
            player: record.player.name.trim().to_string(),
            questions_answered: summary.correct_count,
            total_time_seconds: summary.total_time_with_penalty(),
            penalty_seconds: summary.total_penalty_seconds,
            stage_reached: summary.final_stage,
            created_at: record.created_at,
            is_teacher: record.player.is_teacher,
            is_student: record.player.is_student,
        }
    }
}

impl LeaderboardEntry {
    fn player_key(&self) -> String {
        self.player.trim().to_lowercase()
    }

    fn in_scope(&self, scope: Scope) -> bool {
        match scope {
            Scope::All => true,
            Scope::Students => self.is_student,
            Scope::Teachers => self.is_teacher,
        }
    }
}

/// Display order: more questions first, then lower total time.
pub fn rank_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.questions_answered
        .cmp(&a.questions_answered)
        .then_with(|| a.total_time_seconds.total_cmp(&b.total_time_seconds))
}

/// Whether `candidate` should replace `current` as a player's best run.
///
/// On a full tie the newer run wins.
pub fn is_better(candidate: &LeaderboardEntry, current: &LeaderboardEntry) -> bool {
    match rank_order(candidate, current) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => candidate.created_at > current.created_at,
    }
}

/// Best run per player, kept in rank order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Build a board from records that fall in `period` relative to `now`.
    pub fn build<'a>(
        records: impl IntoIterator<Item = &'a RunRecord>,
        period: Period,
        now: DateTime<Utc>,
    ) -> Self {
        let mut board = Self::default();
        for record in records {
            if period.includes(record.created_at, now) {
                board.insert(LeaderboardEntry::from(record));
            }
        }
        board
    }

    /// Offer one entry; it is kept only if it beats that player's current best.
    pub fn insert(&mut self, entry: LeaderboardEntry) {
        let key = entry.player_key();
        if key.is_empty() {
            return;
        }

        match self.entries.iter().position(|e| e.player_key() == key) {
            Some(idx) if is_better(&entry, &self.entries[idx]) => {
                self.entries[idx] = entry;
            }
            Some(_) => return,
            None => self.entries.push(entry),
        }
        self.entries.sort_by(rank_order);
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries visible under `scope`, in rank order.
    pub fn filtered(&self, scope: Scope) -> Vec<&LeaderboardEntry> {
        self.entries.iter().filter(|e| e.in_scope(scope)).collect()
    }

    /// The best-ranked student, if any student has played.
    pub fn top_student(&self) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|e| e.is_student)
    }

    /// Count of entries per role, for the board header.
    pub fn role_counts(&self) -> HashMap<Scope, usize> {
        let mut counts = HashMap::new();
        for scope in [Scope::All, Scope::Students, Scope::Teachers] {
            counts.insert(scope, self.filtered(scope).len());
        }
        counts
    }
}
