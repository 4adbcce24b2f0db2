//! Error types for the Telegram driver
//!
//! Payload problems (malformed bodies, missing fields, unknown update shapes)
//! are not errors: they resolve to "no match" or `None` fields. Only
//! configuration, transport, and server I/O surface here.

use thiserror::Error;

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Telegram driver
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Telegram Bot API rejected a request
    #[error("telegram api error: {0}")]
    Api(String),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
