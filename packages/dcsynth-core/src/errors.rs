//! Error types for dcsynth-core
//!
//! Provides unified error handling across the crate.

use crate::config::ConfigError;
use crate::shared::models::{EventId, StateId};
use thiserror::Error;

/// Main error type for synthesis operations
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// A state with this label already exists
    #[error("State label '{0}' is already in use")]
    DuplicateStateLabel(String),

    /// Same event label registered with different flags
    #[error("Event '{label}' already exists with different observability/controllability")]
    EventConflict { label: String },

    #[error("Unknown state ID {0}")]
    UnknownState(StateId),

    #[error("Unknown event ID {0}")]
    UnknownEvent(EventId),

    /// Vector label that does not parse
    #[error("Malformed label vector: {0}")]
    MalformedLabel(String),

    /// Text mini-language error
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Controller counts or shared event flags disagree
    #[error("Incompatible automata: {0}")]
    IncompatibleAutomata(String),

    #[error("No initial state: {0}")]
    NoInitialState(String),

    /// Missing prerequisite or exceeded bound
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthesisError {
    /// Create a parse error for a line of the text format
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        SynthesisError::Parse {
            line,
            message: msg.into(),
        }
    }

    /// Create an operation-failed error
    pub fn operation_failed(msg: impl Into<String>) -> Self {
        SynthesisError::OperationFailed(msg.into())
    }

    /// Create an incompatible-automata error
    pub fn incompatible(msg: impl Into<String>) -> Self {
        SynthesisError::IncompatibleAutomata(msg.into())
    }

    pub fn malformed_label(raw: impl Into<String>) -> Self {
        SynthesisError::MalformedLabel(raw.into())
    }

    /// Errors caused by calling an operation before its inputs are ready
    /// (no initial state, exceeded bound), as opposed to malformed input.
    pub fn is_missing_prerequisite(&self) -> bool {
        matches!(
            self,
            SynthesisError::NoInitialState(_) | SynthesisError::OperationFailed(_)
        )
    }
}

/// Result type alias for synthesis operations
pub type Result<T> = std::result::Result<T, SynthesisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SynthesisError::parse(3, "expected 3 fields");
        assert_eq!(err.to_string(), "Parse error on line 3: expected 3 fields");

        let err = SynthesisError::DuplicateStateLabel("q0".to_string());
        assert!(err.to_string().contains("q0"));
    }

    #[test]
    fn test_missing_prerequisite_classification() {
        assert!(SynthesisError::NoInitialState("compose".into()).is_missing_prerequisite());
        assert!(SynthesisError::operation_failed("too many candidates").is_missing_prerequisite());
        assert!(!SynthesisError::incompatible("controllers").is_missing_prerequisite());
        assert!(!SynthesisError::Cancelled.is_missing_prerequisite());
    }

    #[test]
    fn test_config_error_conversion() {
        let err: SynthesisError = ConfigError::UnknownPreset("turbo".into()).into();
        assert!(matches!(err, SynthesisError::Config(_)));
    }
}
