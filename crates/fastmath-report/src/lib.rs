//! fastmath-report: What happens to a run after it ends.
//!
//! Run records are stored as JSON files, ranked into leaderboards, and
//! aggregated into per-fact heat-maps for teachers.

pub mod html;
pub mod leaderboard;
pub mod record;
