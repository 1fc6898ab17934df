//! Error types for anfitrion-qr

use thiserror::Error;

/// QR runner error type
#[derive(Debug, Error)]
pub enum Error {
    /// The runner reported a failure
    #[error("automation run failed: {0}")]
    Run(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Missing or invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
