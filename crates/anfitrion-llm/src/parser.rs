//! AI-assisted guest extraction
//!
//! The model is asked for a strict JSON object; the reply is deserialized
//! and every record re-checked with the deterministic rules (valid email,
//! non-empty name, recognized category, category presence matching the
//! mode). Anything off means an error, which makes the parser chain fall
//! back — model output is never trusted into the sheet unvalidated.

use crate::client::ChatClient;
use crate::error::Error as LlmError;
use anfitrion_core::parser::is_valid_email;
use anfitrion_core::{CategoryMode, Error, GuestCategory, GuestParser, GuestRecord, Result};
use serde::Deserialize;
use tracing::debug;

const SYSTEM_PROMPT: &str = "Eres un extractor de listas de invitados. \
Recibes un mensaje de WhatsApp con invitados y respondes SOLO con JSON: \
{\"guests\":[{\"name\":\"...\",\"email\":\"...\",\"category\":\"Hombres|Mujeres|General\"}]}. \
El campo category solo aparece cuando el mensaje agrupa invitados bajo encabezados \
de categoría; omítelo para listas simples. No inventes nombres ni correos: si un \
invitado no tiene correo, no lo incluyas y añade \"incomplete\":true al objeto raíz.";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtractedGuests {
    guests: Vec<ExtractedGuest>,
    #[serde(default)]
    incomplete: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtractedGuest {
    name: String,
    email: String,
    #[serde(default)]
    category: Option<String>,
}

/// [`GuestParser`] backed by a chat model
pub struct LlmGuestParser {
    client: ChatClient,
}

impl LlmGuestParser {
    /// Create the parser over a client
    #[must_use]
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    fn validate(
        extracted: ExtractedGuests,
        mode: CategoryMode,
    ) -> std::result::Result<Vec<GuestRecord>, LlmError> {
        if extracted.incomplete {
            return Err(LlmError::InvalidOutput(
                "model reported incomplete guest data".to_string(),
            ));
        }
        if extracted.guests.is_empty() {
            return Err(LlmError::InvalidOutput("model extracted no guests".to_string()));
        }

        let mut guests = Vec::with_capacity(extracted.guests.len());
        for guest in extracted.guests {
            let name = guest.name.trim();
            if name.is_empty() {
                return Err(LlmError::InvalidOutput("empty guest name".to_string()));
            }
            if !is_valid_email(guest.email.trim()) {
                return Err(LlmError::InvalidOutput(format!(
                    "invalid email for {name}"
                )));
            }

            let category = match (&guest.category, mode) {
                (Some(raw), CategoryMode::Categorized) => {
                    Some(GuestCategory::from_header(raw).ok_or_else(|| {
                        LlmError::InvalidOutput(format!("unknown category: {raw}"))
                    })?)
                }
                (None, CategoryMode::Categorized) => {
                    return Err(LlmError::InvalidOutput(format!(
                        "missing category for {name}"
                    )))
                }
                (Some(_), CategoryMode::Single) => {
                    return Err(LlmError::InvalidOutput(format!(
                        "unexpected category for {name}"
                    )))
                }
                (None, CategoryMode::Single) => None,
            };

            let mut record = GuestRecord::new(name, guest.email.trim());
            if let Some(category) = category {
                record = record.with_category(category);
            }
            guests.push(record);
        }
        Ok(guests)
    }
}

#[async_trait::async_trait]
impl GuestParser for LlmGuestParser {
    async fn parse(&self, text: &str, mode: CategoryMode) -> Result<Vec<GuestRecord>> {
        let content = self
            .client
            .complete_json(SYSTEM_PROMPT, text)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        let extracted: ExtractedGuests = serde_json::from_str(&content)
            .map_err(|e| Error::Internal(format!("model output was not valid JSON: {e}")))?;

        let guests =
            Self::validate(extracted, mode).map_err(|e| Error::Internal(e.to_string()))?;
        debug!(count = guests.len(), "guests extracted by model");
        Ok(guests)
    }
}
