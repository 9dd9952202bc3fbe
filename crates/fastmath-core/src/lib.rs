//! fastmath-core: Adaptive multiplication drill engine.
//!
//! This crate chooses which fact to ask next, tracks one run's timing,
//! penalties and stage, and summarises the run. It does no I/O beyond
//! reading its configuration file; hosts render questions and store results.

pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod sampling;
pub mod selector;
pub mod session;
pub mod statistics;
pub mod traits;

pub use config::EngineConfig;
pub use error::DrillError;
pub use model::{FactorPair, QuestionResult, RunSummary};
pub use session::{DrillSession, InputStatus, SubmitOutcome, TickStatus};
