//! Error types for the Mentor diagnosis engine
//!
//! This module provides comprehensive error handling using thiserror for
//! structured error definitions and anyhow for error propagation.
//!
//! Fallback-stage failures (`EmbeddingUnavailable`, `ModelUnavailable`,
//! `PredictionFailure`) are recovered inside the classifier pipeline and
//! never reach the caller of `diagnose`.

use thiserror::Error;

/// Main error type for Mentor operations
#[derive(Error, Debug)]
pub enum MentorError {
    /// Text extraction from a screenshot failed; diagnosis aborts with no classification
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// Embedding service request failed or timed out
    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Trained classifier artifact missing or unloadable
    #[error("Classifier model unavailable: {0}")]
    ModelUnavailable(String),

    /// Classifier rejected its input (wrong vector shape, non-finite values)
    #[error("Prediction failed: {0}")]
    PredictionFailure(String),

    /// Progress mutation referenced a task no curriculum module owns
    #[error("Task not in curriculum: {0}")]
    TaskNotInCurriculum(String),

    /// Progress file could not be written after bounded retries
    #[error("Progress persistence failed: {0}")]
    Persistence(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Mentor operations
pub type Result<T> = std::result::Result<T, MentorError>;

/// Convert anyhow::Error to MentorError
impl From<anyhow::Error> for MentorError {
    fn from(err: anyhow::Error) -> Self {
        MentorError::Other(err.to_string())
    }
}

impl MentorError {
    /// True for the fallback-stage failures that degrade the classification
    /// to `Unknown` instead of propagating to the caller.
    pub fn is_recoverable_fallback(&self) -> bool {
        matches!(
            self,
            MentorError::EmbeddingUnavailable(_)
                | MentorError::ModelUnavailable(_)
                | MentorError::PredictionFailure(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MentorError::TaskNotInCurriculum("print_hello".to_string());
        assert_eq!(err.to_string(), "Task not in curriculum: print_hello");
    }

    #[test]
    fn test_fallback_recoverability() {
        assert!(MentorError::EmbeddingUnavailable("down".into()).is_recoverable_fallback());
        assert!(MentorError::ModelUnavailable("missing".into()).is_recoverable_fallback());
        assert!(MentorError::PredictionFailure("shape".into()).is_recoverable_fallback());
        assert!(!MentorError::Persistence("disk full".into()).is_recoverable_fallback());
        assert!(!MentorError::Extraction("unreadable".into()).is_recoverable_fallback());
    }
}
