//! Error types for the Vista gateway

use thiserror::Error;

/// Result type alias for Vista operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Vista gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing credential, bad settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed request body
    #[error("validation error: {0}")]
    Validation(String),

    /// Camera / frame capture error
    #[error("media error: {0}")]
    Media(String),

    /// Speech recognition error
    #[error("recognition error: {0}")]
    Recognition(String),

    /// Speech synthesis error
    #[error("speech error: {0}")]
    Speech(String),

    /// Vision API error (upstream model call)
    #[error("vision error: {0}")]
    Vision(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
