//! Collaborator seams
//!
//! The engine only ever talks to the spreadsheet, the messaging provider,
//! the QR portal automation and the authorization backend through these
//! traits. Production implementations live in the `anfitrion-sheets`,
//! `anfitrion-channels` and `anfitrion-qr` crates.

use crate::error::Result;
use crate::model::{GuestRecord, GuestType, QrDispatchReport};

/// Spreadsheet-backed guest-list store
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SheetStore: Send + Sync {
    /// List currently open events, in sheet order
    async fn open_events(&self) -> Result<Vec<String>>;

    /// Append parsed guests for an event under the given guest type
    async fn append_guests(
        &self,
        event: &str,
        guest_type: GuestType,
        guests: &[GuestRecord],
    ) -> Result<()>;

    /// Guests of an event whose QR code has not been sent yet
    async fn qr_pending(&self, event: &str) -> Result<Vec<GuestRecord>>;

    /// Mark guest rows as having received their QR code
    async fn mark_qr_sent(&self, event: &str, guests: &[GuestRecord]) -> Result<()>;

    /// Registered-guest counts per category/type for an event
    async fn guest_counts(&self, event: &str) -> Result<Vec<(String, u32)>>;
}

/// Outbound messaging provider
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send a text message to a phone number
    async fn send_message(&self, phone: &str, text: &str) -> Result<()>;
}

/// QR portal automation runner
///
/// `trigger` is long-running (browser automation against a third party);
/// callers must run it off the request path.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait QrAutomation: Send + Sync {
    /// Generate and email QR codes for the given guests of an event
    async fn trigger(&self, event: &str, guests: &[GuestRecord]) -> Result<QrDispatchReport>;
}

/// Authorization and QR-dispatch bookkeeping
///
/// Lookup methods fail closed: an unreachable or stale backing store must
/// answer `false`, never grant access.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AuthorizationStore: Send + Sync {
    /// Is the phone in the general authorization list?
    async fn is_authorized(&self, phone: &str) -> bool;

    /// Is the phone in the special-privilege set?
    async fn is_special(&self, phone: &str) -> bool;

    /// Has the event's automatic QR dispatch already run?
    async fn is_qr_sent(&self, event: &str) -> bool;

    /// Record that QR codes were dispatched for the event
    async fn mark_qr_sent(&self, event: &str) -> Result<()>;
}
