//! Twilio WhatsApp channel

mod adapter;
mod config;
pub mod twiml;

pub use adapter::TwilioAdapter;
pub use config::TwilioConfig;
