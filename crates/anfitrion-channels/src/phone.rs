//! Phone number helpers for Twilio WhatsApp addressing
//!
//! Twilio delivers senders as `whatsapp:+5215512345678`; the engine keys
//! everything on digits only.

use anfitrion_core::normalize_phone;

/// Normalize a Twilio WhatsApp address to the digits-only form the engine
/// uses everywhere.
#[must_use]
pub fn from_whatsapp_address(raw: &str) -> String {
    normalize_phone(raw.trim().trim_start_matches("whatsapp:"))
}

/// Render a digits-only phone as a Twilio WhatsApp address.
#[must_use]
pub(crate) fn to_whatsapp_address(digits: &str) -> String {
    format!("whatsapp:+{digits}")
}
