//! Server module for Anfitrion
//!
//! Contains configuration loading, component wiring and the run loop.
//!
//! # Module Structure
//!
//! - `config`: TOML/environment configuration for all components
//! - `init`: Component wiring and the axum serve loop

pub mod config;
mod init;

pub use config::{load_config, AppConfig, ServerConfig};
pub use init::{build_state, run, AppState};
