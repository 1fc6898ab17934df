//! Conversation state machine
//!
//! One turn per inbound message: normalize the phone, split out the QR
//! side-channel command, run the access check, dispatch on the current
//! stage, apply side effects and persist the new state. Replies are the
//! Spanish catalog in [`crate::messages`].
//!
//! Stages: `Initial → AwaitingEventSelection → AwaitingGuestType →
//! AwaitingGuestData → Initial`. `cancelar` resets from any non-initial
//! stage. Help, count and QR commands work in every stage and never
//! advance it.

use crate::access::AccessControl;
use crate::collaborators::SheetStore;
use crate::dispatch::QrDispatcher;
use crate::error::Error;
use crate::messages;
use crate::model::{normalize_phone, ConversationState, GuestType, Stage};
use crate::parser::{looks_categorized, CategoryMode, GuestParser};
use crate::store::ConversationStore;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{error, info, instrument};

static QR_COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:enviar qr|send qr|qr send|procesar qr|mandar qr)\b")
        .expect("QR_COMMAND_RE is a compile-time constant")
});

static HELP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:ayuda|help)\s*$|c[oó]mo\s+(?:funciona|usar)")
        .expect("HELP_RE is a compile-time constant")
});

static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)cu[aá]ntos invitados|contar invitados|total de invitados|invitados totales|lista de invitados",
    )
    .expect("COUNT_RE is a compile-time constant")
});

/// The per-phone conversation engine
pub struct ConversationMachine {
    store: Arc<dyn ConversationStore>,
    sheets: Arc<dyn SheetStore>,
    access: AccessControl,
    parser: Arc<dyn GuestParser>,
    dispatcher: Arc<QrDispatcher>,
}

impl ConversationMachine {
    /// Create the machine over its injected collaborators
    #[must_use]
    pub fn new(
        store: Arc<dyn ConversationStore>,
        sheets: Arc<dyn SheetStore>,
        access: AccessControl,
        parser: Arc<dyn GuestParser>,
        dispatcher: Arc<QrDispatcher>,
    ) -> Self {
        Self {
            store,
            sheets,
            access,
            parser,
            dispatcher,
        }
    }

    /// Process one inbound message and produce the reply text.
    ///
    /// Collaborator failures never escape: they are logged and answered
    /// with a generic apology, leaving the conversation state untouched.
    #[instrument(skip(self, text), fields(from = %from))]
    pub async fn handle_message(&self, from: &str, text: &str) -> String {
        let phone = normalize_phone(from);
        if phone.is_empty() {
            return messages::not_authorized();
        }

        if !self.access.is_authorized(&phone).await {
            info!(phone = %phone, "message from unauthorized phone");
            return messages::not_authorized();
        }

        let mut state = self
            .store
            .get(&phone)
            .await
            .unwrap_or_else(|| ConversationState::new(&phone));

        // QR command is a side channel: detected in any stage, possibly
        // embedded alongside registration text, which still processes.
        let (qr_requested, remainder) = strip_qr_command(text);
        let ack = if qr_requested {
            if self.access.can_trigger_qr(&phone).await {
                self.dispatcher
                    .spawn(Some(phone.clone()), state.selected_event.clone(), false);
                Some(messages::qr_ack())
            } else {
                Some(messages::qr_denied())
            }
        } else {
            None
        };

        // A bare QR command is answered by the ack alone
        let text = remainder.trim();
        if text.is_empty() {
            if let Some(ack) = ack {
                return ack;
            }
        }

        let reply = self.handle_turn(&mut state, text).await;
        self.store.set(state).await;

        match ack {
            Some(ack) => format!("{ack}\n\n{reply}"),
            None => reply,
        }
    }

    async fn handle_turn(&self, state: &mut ConversationState, text: &str) -> String {
        if text.eq_ignore_ascii_case("cancelar") {
            state.reset();
            return messages::canceled();
        }

        if HELP_RE.is_match(text) {
            return messages::help();
        }

        if COUNT_RE.is_match(text) {
            return self.handle_count(state).await;
        }

        match state.stage {
            Stage::Initial => self.handle_initial(state).await,
            Stage::AwaitingEventSelection => self.handle_event_selection(state, text).await,
            Stage::AwaitingGuestType => self.handle_guest_type(state, text).await,
            Stage::AwaitingGuestData => self.handle_guest_data(state, text).await,
        }
    }

    async fn handle_initial(&self, state: &mut ConversationState) -> String {
        let events = match self.sheets.open_events().await {
            Ok(events) => events,
            Err(e) => {
                error!(error = %e, "failed to load open events");
                return messages::apology();
            }
        };

        match events.len() {
            0 => messages::no_open_events(),
            1 => {
                let event = events[0].clone();
                if let Err(e) = self.access.check_register(&state.phone, &event).await {
                    return messages::access_error(&e);
                }
                state.selected_event = Some(event.clone());
                state.stage = Stage::AwaitingGuestType;
                messages::choose_guest_type(&event)
            }
            _ => {
                state.pending_events = events.clone();
                state.stage = Stage::AwaitingEventSelection;
                messages::choose_event(&events)
            }
        }
    }

    async fn handle_event_selection(&self, state: &mut ConversationState, text: &str) -> String {
        let Some(event) = select_event(&state.pending_events, text) else {
            return messages::invalid_selection(&state.pending_events);
        };

        if let Err(e) = self.access.check_register(&state.phone, &event).await {
            return messages::access_error(&e);
        }

        state.selected_event = Some(event.clone());
        state.stage = Stage::AwaitingGuestType;
        messages::choose_guest_type(&event)
    }

    async fn handle_guest_type(&self, state: &mut ConversationState, text: &str) -> String {
        if let Some(guest_type) = GuestType::from_input(text) {
            let event = state.selected_event.clone().unwrap_or_default();
            state.guest_type = Some(guest_type);
            state.stage = Stage::AwaitingGuestData;
            return messages::prompt_guest_data(&event, guest_type);
        }

        // Categorized lists carry the category themselves; skip the question
        if looks_categorized(text) {
            return self.register_guests(state, text).await;
        }

        let event = state.selected_event.clone().unwrap_or_default();
        messages::choose_guest_type(&event)
    }

    async fn handle_guest_data(&self, state: &mut ConversationState, text: &str) -> String {
        self.register_guests(state, text).await
    }

    /// Parse and persist a guest batch. On success the state resets to
    /// `Initial`; on any error it is left exactly as it was.
    async fn register_guests(&self, state: &mut ConversationState, text: &str) -> String {
        let Some(event) = state.selected_event.clone() else {
            state.reset();
            return messages::apology();
        };

        if let Err(e) = self.access.check_register(&state.phone, &event).await {
            return messages::access_error(&e);
        }

        let mode = if looks_categorized(text) {
            CategoryMode::Categorized
        } else {
            CategoryMode::Single
        };

        let guests = match self.parser.parse(text, mode).await {
            Ok(guests) => guests,
            Err(Error::Parse(e)) => return messages::parse_error(&e),
            Err(e) => {
                error!(error = %e, "parser collaborator failed");
                return messages::apology();
            }
        };

        let guest_type = state.guest_type.unwrap_or(GuestType::General);
        if let Err(e) = self.sheets.append_guests(&event, guest_type, &guests).await {
            error!(event = %event, error = %e, "failed to append guests");
            return messages::apology();
        }

        info!(
            event = %event,
            count = guests.len(),
            guest_type = %guest_type,
            "guests registered"
        );
        let reply = messages::registration_success(&guests, guest_type, &event);
        state.reset();
        reply
    }

    async fn handle_count(&self, state: &ConversationState) -> String {
        let event = match &state.selected_event {
            Some(event) => event.clone(),
            None => match self.sheets.open_events().await {
                Ok(events) if events.len() == 1 => events[0].clone(),
                Ok(events) if events.is_empty() => return messages::no_open_events(),
                Ok(_) => return messages::count_needs_event(),
                Err(e) => {
                    error!(error = %e, "failed to load open events");
                    return messages::apology();
                }
            },
        };

        match self.sheets.guest_counts(&event).await {
            Ok(counts) => messages::count_summary(&event, &counts),
            Err(e) => {
                error!(event = %event, error = %e, "failed to load guest counts");
                messages::apology()
            }
        }
    }
}

/// Remove the QR command from the text, reporting whether it was present.
/// The rest of the message (guest data, selections) is processed normally.
fn strip_qr_command(text: &str) -> (bool, String) {
    if !QR_COMMAND_RE.is_match(text) {
        return (false, text.to_string());
    }
    (true, QR_COMMAND_RE.replace_all(text, "").into_owned())
}

/// Match a selection reply against the offered events: 1-based index or
/// case-insensitive name.
fn select_event(events: &[String], text: &str) -> Option<String> {
    let text = text.trim();
    if let Ok(index) = text.parse::<usize>() {
        if (1..=events.len()).contains(&index) {
            return Some(events[index - 1].clone());
        }
        return None;
    }
    events
        .iter()
        .find(|e| e.eq_ignore_ascii_case(text))
        .cloned()
}

#[cfg(test)]
mod tests;
