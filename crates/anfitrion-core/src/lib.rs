//! Anfitrion Core - Guest-list conversation engine
//!
//! This crate provides the conversational core of the Anfitrion bot:
//! - Per-phone conversation state machine (event selection, guest type,
//!   guest data entry)
//! - Guest-text parser (plain `Nombre - correo` lines or category blocks)
//! - Access and privilege checks (registration window, QR dispatch rights)
//! - Background QR dispatch over the automation collaborator
//!
//! Collaborators (spreadsheet store, messaging gateway, QR automation,
//! authorization store) are traits; production implementations live in the
//! `anfitrion-sheets`, `anfitrion-channels` and `anfitrion-qr` crates.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod access;
pub mod collaborators;
pub mod dispatch;
pub mod error;
pub mod machine;
pub mod messages;
pub mod model;
pub mod parser;
pub mod store;

pub use error::{AccessError, Error, ParseError, Result};

// Re-export the data model
pub use model::{
    normalize_phone, ConversationState, GuestCategory, GuestRecord, GuestType, QrDispatchReport,
    Stage,
};

// Re-export collaborator seams
pub use collaborators::{AuthorizationStore, MessagingGateway, QrAutomation, SheetStore};

// Re-export the engine pieces
pub use access::AccessControl;
pub use dispatch::QrDispatcher;
pub use machine::ConversationMachine;
pub use parser::{CategoryMode, ChainParser, DeterministicParser, GuestParser};
pub use store::{ConversationStore, MemoryConversationStore};
