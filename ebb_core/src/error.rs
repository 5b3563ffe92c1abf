//! Error types for the ebb_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ebb_core operations
///
/// The prediction engine itself never fails; these variants come from the
/// store embeddings, configuration and export paths.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Caller supplied something unusable (bad date string, unknown enum name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
