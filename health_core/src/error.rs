//! Error types for the health_core library.

use std::io;

use crate::auth::AuthError;
use crate::validate::ValidationError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for health_core operations
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

    /// User input rejected by a validator
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Login, registration or token validation failed
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
