//! Drill engine error types.
//!
//! Normal play never produces these: wrong answers and timeouts are
//! reported through [`crate::session::InputStatus`]. These errors cover a
//! host driving the session out of order and configurations that cannot
//! produce a question.

use thiserror::Error;

/// Errors returned by the drill engine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DrillError {
    /// The stage produced no candidate pairs at all.
    #[error("stage {stage} has no candidate factor pairs")]
    DegenerateStage { stage: u32 },

    /// Input was submitted while no question was being asked.
    #[error("no question is active")]
    NoActiveQuestion,

    /// A new question was requested before the current one was resolved.
    #[error("question {question_number} is still in progress")]
    QuestionInProgress { question_number: u32 },

    /// The run already ended on a timeout.
    #[error("the run has ended")]
    RunEnded,

    /// The engine configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DrillError {
    /// Returns `true` if the host can keep playing the same session after
    /// seeing this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DrillError::NoActiveQuestion | DrillError::QuestionInProgress { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classification() {
        assert!(DrillError::NoActiveQuestion.is_recoverable());
        assert!(DrillError::QuestionInProgress { question_number: 3 }.is_recoverable());
        assert!(!DrillError::RunEnded.is_recoverable());
        assert!(!DrillError::DegenerateStage { stage: 0 }.is_recoverable());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            DrillError::DegenerateStage { stage: 0 }.to_string(),
            "stage 0 has no candidate factor pairs"
        );
        assert_eq!(
            DrillError::InvalidConfig("timer_seconds must be positive".into()).to_string(),
            "invalid configuration: timer_seconds must be positive"
        );
    }
}
