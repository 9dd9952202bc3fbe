//! Run records with JSON persistence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fastmath_core::model::RunSummary;

/// Version stamped on every record.
pub const GAME_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Session labels are written in Mountain Standard Time (UTC-7).
const LABEL_OFFSET_HOURS: i64 = 7;

/// Who played a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub is_teacher: bool,
    #[serde(default)]
    pub is_student: bool,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A finished run as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique record identifier.
    pub id: Uuid,
    pub player: Player,
    /// Human-readable label: first and last name plus MST date and time.
    pub session_label: String,
    pub created_at: DateTime<Utc>,
    /// Version of the game that produced the record.
    pub version: String,
    pub summary: RunSummary,
}

impl RunRecord {
    /// Wrap a summary into a record stamped now.
    pub fn new(player: Player, summary: RunSummary) -> Self {
        Self::created_at(player, summary, Utc::now())
    }

    pub fn created_at(player: Player, summary: RunSummary, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_label: session_label(&player.name, created_at),
            player,
            created_at,
            version: GAME_VERSION.to_string(),
            summary,
        }
    }

    /// File name the record is saved under inside a records directory.
    pub fn file_name(&self) -> String {
        let id = self.id.simple().to_string();
        format!(
            "run-{}-{}.json",
            self.created_at.format("%Y-%m-%dT%H%M%S"),
            &id[..8]
        )
    }

    /// Save the record as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize run record")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write run record to {}", path.display()))?;
        Ok(())
    }

    /// Save the record into `dir` under [`RunRecord::file_name`].
    pub fn save_in_dir(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        self.save_json(&path)?;
        tracing::debug!(path = %path.display(), "run record saved");
        Ok(path)
    }

    /// Load a record from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read run record from {}", path.display()))?;
        let record: RunRecord = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse run record {}", path.display()))?;
        Ok(record)
    }
}

/// Load every `.json` record in a directory, oldest first.
///
/// Files with other extensions are ignored; a malformed JSON file is an
/// error.
pub fn load_records(dir: &Path) -> Result<Vec<RunRecord>> {
    anyhow::ensure!(
        dir.is_dir(),
        "records directory not found: {}",
        dir.display()
    );

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    entries.sort();

    let mut records = entries
        .iter()
        .map(|p| RunRecord::load_json(p))
        .collect::<Result<Vec<_>>>()?;
    records.sort_by_key(|r| r.created_at);
    Ok(records)
}

/// Build a label like `"Ada Lovelace 10-19-2026 08:30"`.
///
/// Only the first two words of the name are used; an empty name becomes
/// `Player`. The time is shown in MST.
pub fn session_label(player_name: &str, at: DateTime<Utc>) -> String {
    let mut parts = player_name.split_whitespace();
    let first = parts.next().unwrap_or("Player");
    let last = parts.next();

    let mst = at.naive_utc() - chrono::Duration::hours(LABEL_OFFSET_HOURS);
    let stamp = mst.format("%m-%d-%Y %H:%M");

    match last {
        Some(last) => format!("{first} {last} {stamp}"),
        None => format!("{first} {stamp}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fastmath_core::model::QuestionResult;

    fn summary(correct: u32) -> RunSummary {
        RunSummary {
            correct_count: correct,
            total_time_true_seconds: correct as f64 * 1.5,
            total_penalty_seconds: 2.0,
            final_stage: 8,
            timed_out: true,
            results: (1..=correct)
                .map(|n| QuestionResult {
                    question_number: n,
                    a: 3,
                    b: n,
                    stage: 8,
                    time_taken_seconds: 1.5,
                    mistakes: 0,
                    success: true,
                })
                .collect(),
        }
    }

    #[test]
    fn label_uses_mst_and_two_names() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 5, 30, 0).unwrap();
        assert_eq!(
            session_label("Ada King Lovelace", at),
            "Ada King 02-28-2025 22:30"
        );
        assert_eq!(session_label("  ", at), "Player 02-28-2025 22:30");
        assert_eq!(session_label("Grace", at), "Grace 02-28-2025 22:30");
    }

    #[test]
    fn file_name_is_timestamped() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 5, 30, 9).unwrap();
        let record = RunRecord::created_at(Player::new("Ada"), summary(1), at);
        let name = record.file_name();
        assert!(name.starts_with("run-2025-03-01T053009-"), "{name}");
        assert!(name.ends_with(".json"));
        assert_eq!(record.version, GAME_VERSION);
    }

    #[test]
    fn json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let record = RunRecord::new(Player::new("Ada Lovelace"), summary(3));
        let path = record.save_in_dir(dir.path()).unwrap();

        let loaded = RunRecord::load_json(&path).unwrap();
        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.player.name, "Ada Lovelace");
        assert_eq!(loaded.summary, record.summary);
    }

    #[test]
    fn load_records_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let later = Utc.with_ymd_and_hms(2025, 5, 2, 0, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        RunRecord::created_at(Player::new("B"), summary(2), later)
            .save_in_dir(dir.path())
            .unwrap();
        RunRecord::created_at(Player::new("A"), summary(1), earlier)
            .save_in_dir(dir.path())
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let records = load_records(dir.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].player.name, "A");
        assert_eq!(records[1].player.name, "B");
    }

    #[test]
    fn load_records_missing_dir() {
        let err = load_records(Path::new("no-such-records-dir")).unwrap_err();
        assert!(err.to_string().contains("records directory not found"));
    }

    #[test]
    fn malformed_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
        assert!(load_records(dir.path()).is_err());
    }
}
