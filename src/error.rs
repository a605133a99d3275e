//! Error types for the feedback desk
//!
//! This module provides structured error handling using thiserror for the
//! library surface and anyhow for propagation at the binary edges.

use crate::types::EnrichmentField;
use thiserror::Error;

/// Main error type for feedback desk operations
#[derive(Error, Debug)]
pub enum FeedbackError {
    /// Malformed user input (empty review, out-of-range rating)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Text generation failed for a single enrichment field
    #[error("Enrichment failed for {field}: {reason}")]
    Enrichment {
        field: EnrichmentField,
        reason: String,
    },

    /// Text generation API request failed
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Record store read or append failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Admin credential rejected
    #[error("Authentication failed")]
    Auth,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error outside the record store
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

impl FeedbackError {
    /// Build a validation error from any message
    pub fn validation(msg: impl Into<String>) -> Self {
        FeedbackError::Validation(msg.into())
    }

    /// Build an enrichment error for one field
    pub fn enrichment(field: EnrichmentField, reason: impl std::fmt::Display) -> Self {
        FeedbackError::Enrichment {
            field,
            reason: reason.to_string(),
        }
    }

    /// Build a storage error from any displayable cause
    pub fn storage(cause: impl std::fmt::Display) -> Self {
        FeedbackError::Storage(cause.to_string())
    }
}

/// Result type alias for feedback desk operations
pub type Result<T> = std::result::Result<T, FeedbackError>;

/// Convert anyhow::Error to FeedbackError
impl From<anyhow::Error> for FeedbackError {
    fn from(err: anyhow::Error) -> Self {
        FeedbackError::Other(err.to_string())
    }
}

/// CSV failures only originate in the record store
impl From<csv::Error> for FeedbackError {
    fn from(err: csv::Error) -> Self {
        FeedbackError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FeedbackError::validation("review must not be empty");
        assert_eq!(
            err.to_string(),
            "Validation error: review must not be empty"
        );
    }

    #[test]
    fn test_enrichment_error_names_field() {
        let err = FeedbackError::enrichment(EnrichmentField::Summary, "timed out");
        assert_eq!(err.to_string(), "Enrichment failed for ai_summary: timed out");
    }

    #[test]
    fn test_auth_error_is_generic() {
        assert_eq!(FeedbackError::Auth.to_string(), "Authentication failed");
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: FeedbackError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, FeedbackError::Other(ref m) if m == "boom"));
    }
}
