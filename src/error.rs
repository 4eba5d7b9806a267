//! Error types for the wealth advisory orchestrator

use thiserror::Error;

/// Result type alias for advisory operations
pub type Result<T> = std::result::Result<T, AdvisoryError>;

#[derive(Error, Debug)]
pub enum AdvisoryError {

    // =============================
    // Request / Domain Errors
    // =============================

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Search error: {0}")]
    SearchError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("No storage backend available: {0}")]
    StorageUnavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
