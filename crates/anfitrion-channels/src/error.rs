//! Error types for anfitrion-channels

use thiserror::Error;

/// Channel error type
#[derive(Debug, Error)]
pub enum Error {
    /// Twilio API error
    #[error("twilio error: {0}")]
    Twilio(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Missing or invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
