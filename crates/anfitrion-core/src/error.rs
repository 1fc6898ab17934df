//! Error types for anfitrion-core
//!
//! Parse and access errors are recovered locally (they become a Spanish
//! user-facing message and never mutate conversation state); collaborator
//! errors are logged and surfaced as a generic apology.

use thiserror::Error;

/// Guest-text parsing error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A line has a name without a valid email, or an email without a name
    #[error("unbalanced guest data in line: {line}")]
    UnbalancedData {
        /// The offending input line
        line: String,
    },

    /// A line does not contain exactly one syntactically valid email address
    #[error("invalid email format in line: {line}")]
    InvalidEmailFormat {
        /// The offending input line
        line: String,
    },

    /// A category header outside the recognized set, or guest data outside
    /// any category block in categorized input
    #[error("unrecognized category header: {header}")]
    UnrecognizedCategory {
        /// The offending header line
        header: String,
    },

    /// No guest data found in the input
    #[error("empty guest input")]
    EmptyInput,
}

/// Access/privilege error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Phone is not in the general authorization list
    #[error("phone not authorized")]
    NotAuthorized,

    /// QR codes were already dispatched for the event and the phone holds
    /// no special privilege
    #[error("registration closed for event: {event}")]
    RegistrationClosed {
        /// The event whose registration window has closed
        event: String,
    },

    /// Phone may not trigger QR dispatch
    #[error("qr command denied")]
    QrCommandDenied,
}

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Guest-text parsing failed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Access check rejected the operation
    #[error("access error: {0}")]
    Access(#[from] AccessError),

    /// Spreadsheet collaborator failed
    #[error("sheet error: {0}")]
    Sheet(String),

    /// Messaging gateway failed
    #[error("message send failed: {0}")]
    MessageSend(String),

    /// QR automation collaborator failed
    #[error("qr automation failed: {0}")]
    Automation(String),

    /// Internal error (serialization, unavailable optional collaborator)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
