//! Data model for the guest-list conversation engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalize a phone number to its digits-only form.
///
/// All stores and checks key on this form; `"whatsapp:+52 1 55-1234"` and
/// `"5215512 34"` compare equal after normalization.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Guest category, embedded in categorized input via header lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuestCategory {
    /// "Hombres:" block
    Hombres,
    /// "Mujeres:" block
    Mujeres,
    /// "General:" block
    General,
}

impl GuestCategory {
    /// Recognize a category header line (case-insensitive, trailing colon
    /// optional, singular form accepted). Returns `None` for anything
    /// outside the fixed set.
    #[must_use]
    pub fn from_header(line: &str) -> Option<Self> {
        let word = line.trim().trim_end_matches(':').trim();
        match word.to_lowercase().as_str() {
            "hombres" | "hombre" => Some(Self::Hombres),
            "mujeres" | "mujer" => Some(Self::Mujeres),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    /// Get the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hombres => "Hombres",
            Self::Mujeres => "Mujeres",
            Self::General => "General",
        }
    }
}

impl std::fmt::Display for GuestCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Guest type selected during the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuestType {
    /// VIP guest list
    Vip,
    /// General guest list
    General,
}

impl GuestType {
    /// Parse a user reply ("vip" / "general", case-insensitive)
    #[must_use]
    pub fn from_input(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "vip" => Some(Self::Vip),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    /// Get the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vip => "VIP",
            Self::General => "General",
        }
    }
}

impl std::fmt::Display for GuestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed guest, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestRecord {
    /// Guest name, trimmed
    pub name: String,
    /// Guest email; domain lowercased, local part preserved
    pub email: String,
    /// Category, present for categorized input
    pub category: Option<GuestCategory>,
}

impl GuestRecord {
    /// Create a new guest record, normalizing name and email
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let email = email.into();
        let email = match email.split_once('@') {
            Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
            None => email,
        };
        Self {
            name: name.into().trim().to_string(),
            email,
            category: None,
        }
    }

    /// Set the category
    #[must_use]
    pub fn with_category(mut self, category: GuestCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// A named point in the per-phone conversation state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// No conversation in progress
    #[default]
    Initial,
    /// An event list was offered, waiting for a pick
    AwaitingEventSelection,
    /// Waiting for VIP/General (or categorized guest data directly)
    AwaitingGuestType,
    /// Waiting for guest name/email lines
    AwaitingGuestData,
}

/// Per-phone conversation state
///
/// Created on the first message from a phone and mutated on every turn.
/// The engine never destroys it; memory hygiene is a host concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Normalized phone number (digits only)
    pub phone: String,
    /// Current stage
    pub stage: Stage,
    /// Event chosen for the registration in progress
    pub selected_event: Option<String>,
    /// Guest type chosen for the registration in progress
    pub guest_type: Option<GuestType>,
    /// Events offered during selection, in the order listed to the user
    pub pending_events: Vec<String>,
}

impl ConversationState {
    /// Create the initial state for a phone
    #[must_use]
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            stage: Stage::Initial,
            selected_event: None,
            guest_type: None,
            pending_events: Vec::new(),
        }
    }

    /// Return to `Initial`, discarding any partially entered data
    pub fn reset(&mut self) {
        self.stage = Stage::Initial;
        self.selected_event = None;
        self.guest_type = None;
        self.pending_events.clear();
    }
}

/// Outcome of a completed QR automation run for one event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrDispatchReport {
    /// Number of guests the portal processed
    pub processed_count: u32,
    /// When the run completed
    pub completed_at: DateTime<Utc>,
}
