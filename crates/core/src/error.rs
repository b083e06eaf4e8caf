//! Error types for Asana.
//!
//! This module defines a unified error enum that covers every error category
//! in the workspace: configuration, I/O, corpus loading, embeddings, query
//! validation and query-log storage.

use thiserror::Error;

/// Unified error type for Asana.
///
/// Fallible functions return `Result<T, AppError>`. The query pipeline itself
/// absorbs corpus and embedding failures; these variants surface only from
/// the lower-level building blocks and from the command-line caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Corpus loading and validation errors
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Primary embedding provider failed or is not loaded
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Empty or otherwise unusable query text
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Query log storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::InvalidQuery("Query is required".to_string());
        assert_eq!(err.to_string(), "Invalid query: Query is required");

        let err = AppError::EmbeddingUnavailable("ollama unreachable".to_string());
        assert!(err.to_string().starts_with("Embedding unavailable"));
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: AppError = parse_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
