//! Error types for anfitrion-llm

use thiserror::Error;

/// LLM error type
#[derive(Debug, Error)]
pub enum Error {
    /// Provider API rejected the request
    #[error("llm api error: {0}")]
    Api(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// The model's output did not match the expected schema
    #[error("invalid model output: {0}")]
    InvalidOutput(String),

    /// Missing or invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
