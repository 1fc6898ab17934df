//! Anfitrion LLM - AI-assisted guest-text parsing
//!
//! An OpenAI-compatible chat-completions client and a `GuestParser`
//! implementation that asks the model to extract guests as JSON, then
//! re-validates the output with the deterministic rules before accepting
//! it. The AI path is an optimization: any failure here makes the chain
//! fall back to the deterministic parser.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod parser;

pub use client::{ChatClient, LlmConfig};
pub use error::{Error, Result};
pub use parser::LlmGuestParser;
