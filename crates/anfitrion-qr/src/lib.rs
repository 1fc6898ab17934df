//! Anfitrion QR - Portal automation client
//!
//! The actual QR issuing runs in a separate automation runner that drives
//! the ticketing portal with a headless browser. This crate only implements
//! the trigger contract: post the guest batch to the runner and wait for
//! its completion report. Runs take minutes; callers keep them off the
//! request path (see `anfitrion_core::QrDispatcher`).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;

pub use client::{QrRunnerClient, QrRunnerConfig};
pub use error::{Error, Result};
