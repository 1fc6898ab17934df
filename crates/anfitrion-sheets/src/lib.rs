//! Anfitrion Sheets - Spreadsheet-backed guest-list store
//!
//! Implements the engine's `SheetStore` and `AuthorizationStore` seams over
//! the Google Sheets v4 values API. The workbook holds three tabs:
//!
//! - `Eventos`: event name, open flag, QR-dispatched flag, dispatch date
//! - `Invitados`: one row per registered guest
//! - `Autorizados`: authorized phones and the special-privilege flag
//!
//! Read paths cache with an explicit TTL so a chatty conversation does not
//! hammer the API; writes invalidate the affected cache.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth_store;
pub mod cache;
pub mod client;
pub mod error;

pub use auth_store::SheetAuthorizationStore;
pub use cache::TtlCache;
pub use client::{EventRow, SheetsClient, SheetsConfig};
pub use error::{Error, Result};
