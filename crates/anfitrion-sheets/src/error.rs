//! Error types for anfitrion-sheets

use thiserror::Error;

/// Sheets error type
#[derive(Debug, Error)]
pub enum Error {
    /// Sheets API rejected the request
    #[error("sheets api error: {0}")]
    Api(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected response shape
    #[error("decode error: {0}")]
    Decode(String),

    /// Missing or invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for anfitrion_core::Error {
    fn from(e: Error) -> Self {
        anfitrion_core::Error::Sheet(e.to_string())
    }
}
