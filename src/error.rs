use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the lawbot pipeline
#[derive(Error, Debug)]
pub enum LawbotError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// Persisted passage collection is absent; fatal to startup
    #[error("Passage data not found: {path}. Run the ingestion job first.")]
    DataNotFound { path: PathBuf },

    /// A passage record violated a store invariant
    #[error("Invalid passage record at index {index}: {message}")]
    InvalidPassage { index: usize, message: String },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// Embedding backend failures (model init or query-time embedding)
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Reranker model failures
    #[error("Reranker error: {0}")]
    Rerank(String),

    /// Generation service failures
    #[error("Generation error: {0}")]
    Generation(String),

    /// Retrieval pipeline failures
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for lawbot operations
pub type Result<T> = std::result::Result<T, LawbotError>;
