//! Anfitrion Channels - Messaging adapters
//!
//! This crate provides the outbound messaging gateway and inbound webhook
//! helpers for WhatsApp via Twilio:
//! - REST adapter for the Twilio Messages API (implements
//!   `anfitrion_core::MessagingGateway`)
//! - TwiML rendering for synchronous webhook replies
//! - Phone normalization for Twilio's `whatsapp:+...` addressing

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod phone;
pub mod twilio;

pub use error::{Error, Result};

// Re-export the Twilio adapter
pub use twilio::{twiml, TwilioAdapter, TwilioConfig};

// Re-export phone helpers
pub use phone::from_whatsapp_address;
