//! Google Sheets v4 values API client
//!
//! Tabs and columns:
//! - `Eventos!A2:D`: nombre, abierto, qr_enviado, fecha_envio
//! - `Invitados!A2:G`: id, evento, categoria, nombre, correo, fecha,
//!   qr_enviado
//! - `Autorizados!A2:B`: telefono, especial (read by
//!   [`crate::SheetAuthorizationStore`])

use crate::cache::TtlCache;
use crate::error::{Error, Result};
use anfitrion_core::{GuestCategory, GuestRecord, GuestType, SheetStore};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const EVENTS_RANGE: &str = "Eventos!A2:D";
const GUESTS_RANGE: &str = "Invitados!A2:G";

/// Google Sheets configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet ID (from the sheet URL)
    pub spreadsheet_id: String,
    /// OAuth bearer token for the service account
    pub api_token: String,
    /// API base URL (override for testing)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Seconds a cached read stays fresh
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_base_url() -> String {
    "https://sheets.googleapis.com/v4/spreadsheets".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    // The original refreshed its connection every 30 minutes
    1800
}

impl SheetsConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let spreadsheet_id = std::env::var("SHEETS_SPREADSHEET_ID")
            .map_err(|_| Error::InvalidConfig("SHEETS_SPREADSHEET_ID not set".to_string()))?;

        let api_token = std::env::var("SHEETS_API_TOKEN")
            .map_err(|_| Error::InvalidConfig("SHEETS_API_TOKEN not set".to_string()))?;

        Ok(Self::new(spreadsheet_id, api_token))
    }

    /// Create with required fields
    #[must_use]
    pub fn new(spreadsheet_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            api_token: api_token.into(),
            base_url: default_base_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the cache TTL
    #[must_use]
    pub fn with_cache_ttl(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{}/{}/values/{}{}",
            self.base_url, self.spreadsheet_id, range, suffix
        )
    }
}

/// One row of the `Eventos` tab
#[derive(Debug, Clone, Serialize)]
pub struct EventRow {
    /// Event name
    pub name: String,
    /// Is registration open?
    pub open: bool,
    /// Has the automatic QR dispatch run?
    pub qr_sent: bool,
    /// When the dispatch ran, as recorded in the sheet
    pub sent_at: Option<String>,
}

#[derive(Debug, Clone)]
struct GuestRow {
    sheet_row: usize,
    event: String,
    category: String,
    name: String,
    email: String,
    qr_sent: bool,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Google Sheets client
pub struct SheetsClient {
    config: SheetsConfig,
    client: reqwest::Client,
    events_cache: RwLock<TtlCache<Vec<EventRow>>>,
}

impl SheetsClient {
    /// Create a new client
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: SheetsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        let ttl = Duration::from_secs(config.cache_ttl_secs);
        info!(spreadsheet = %config.spreadsheet_id, "Sheets client initialized");

        Ok(Self {
            config,
            client,
            events_cache: RwLock::new(TtlCache::new(ttl)),
        })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        Self::new(SheetsConfig::from_env()?)
    }

    pub(crate) async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let response = self
            .client
            .get(self.config.values_url(range, ""))
            .bearer_auth(&self.config.api_token)
            .send()
            .await
            .map_err(|e| Error::Network(format!("values get failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "values get returned {}",
                response.status()
            )));
        }

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("invalid value range: {e}")))?;
        Ok(range.values)
    }

    async fn append_values(&self, range: &str, values: Vec<Vec<String>>) -> Result<()> {
        let response = self
            .client
            .post(
                self.config
                    .values_url(range, ":append?valueInputOption=RAW"),
            )
            .bearer_auth(&self.config.api_token)
            .json(&json!({ "values": values }))
            .send()
            .await
            .map_err(|e| Error::Network(format!("values append failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "values append returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn batch_update(&self, data: Vec<(String, Vec<Vec<String>>)>) -> Result<()> {
        let entries: Vec<_> = data
            .into_iter()
            .map(|(range, values)| json!({ "range": range, "values": values }))
            .collect();

        let response = self
            .client
            .post(format!(
                "{}/{}/values:batchUpdate",
                self.config.base_url, self.config.spreadsheet_id
            ))
            .bearer_auth(&self.config.api_token)
            .json(&json!({ "valueInputOption": "RAW", "data": entries }))
            .send()
            .await
            .map_err(|e| Error::Network(format!("batch update failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "batch update returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Load the `Eventos` tab, served from cache while fresh
    pub async fn load_events(&self) -> Result<Vec<EventRow>> {
        if let Some(events) = self.events_cache.read().await.get() {
            return Ok(events.clone());
        }

        let rows = self.get_values(EVENTS_RANGE).await?;
        let events: Vec<EventRow> = rows
            .into_iter()
            .filter(|row| !row.is_empty() && !row[0].trim().is_empty())
            .map(|row| EventRow {
                name: row[0].trim().to_string(),
                open: cell_flag(row.get(1)),
                qr_sent: cell_flag(row.get(2)),
                sent_at: row.get(3).filter(|s| !s.is_empty()).cloned(),
            })
            .collect();

        debug!(count = events.len(), "events loaded from sheet");
        self.events_cache.write().await.put(events.clone());
        Ok(events)
    }

    /// Has the event's QR dispatch already run, according to the sheet?
    pub async fn event_qr_sent(&self, event: &str) -> Result<bool> {
        let events = self.load_events().await?;
        Ok(events
            .iter()
            .any(|e| e.name.eq_ignore_ascii_case(event) && e.qr_sent))
    }

    /// Flag the event as QR-dispatched and stamp the date
    #[instrument(skip(self))]
    pub async fn set_event_qr_sent(&self, event: &str) -> Result<()> {
        let events = self.load_events().await?;
        let index = events
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(event))
            .ok_or_else(|| Error::Api(format!("unknown event: {event}")))?;

        // Data starts on sheet row 2
        let sheet_row = index + 2;
        let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.batch_update(vec![(
            format!("Eventos!C{sheet_row}:D{sheet_row}"),
            vec![vec!["TRUE".to_string(), stamp]],
        )])
        .await?;

        self.events_cache.write().await.invalidate();
        Ok(())
    }

    async fn load_guest_rows(&self) -> Result<Vec<GuestRow>> {
        let rows = self.get_values(GUESTS_RANGE).await?;
        Ok(rows
            .into_iter()
            .enumerate()
            .filter(|(_, row)| row.len() >= 5)
            .map(|(i, row)| GuestRow {
                sheet_row: i + 2,
                event: row[1].trim().to_string(),
                category: row[2].trim().to_string(),
                name: row[3].trim().to_string(),
                email: row[4].trim().to_string(),
                qr_sent: cell_flag(row.get(6)),
            })
            .collect())
    }
}

/// TRUE/FALSE style sheet cell to bool
fn cell_flag(cell: Option<&String>) -> bool {
    cell.is_some_and(|v| {
        matches!(
            v.trim().to_lowercase().as_str(),
            "true" | "1" | "sí" | "si" | "x"
        )
    })
}

#[async_trait::async_trait]
impl SheetStore for SheetsClient {
    async fn open_events(&self) -> anfitrion_core::Result<Vec<String>> {
        let events = self.load_events().await?;
        Ok(events
            .into_iter()
            .filter(|e| e.open)
            .map(|e| e.name)
            .collect())
    }

    async fn append_guests(
        &self,
        event: &str,
        guest_type: GuestType,
        guests: &[GuestRecord],
    ) -> anfitrion_core::Result<()> {
        let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let rows: Vec<Vec<String>> = guests
            .iter()
            .map(|guest| {
                let id = Uuid::new_v4().to_string()[..8].to_string();
                let category = guest
                    .category
                    .map_or_else(|| guest_type.as_str().to_string(), |c| c.as_str().to_string());
                vec![
                    id,
                    event.to_string(),
                    category,
                    guest.name.clone(),
                    guest.email.clone(),
                    stamp.clone(),
                    "FALSE".to_string(),
                ]
            })
            .collect();

        self.append_values("Invitados!A:G", rows).await?;
        info!(event = %event, count = guests.len(), "guests appended to sheet");
        Ok(())
    }

    async fn qr_pending(&self, event: &str) -> anfitrion_core::Result<Vec<GuestRecord>> {
        let rows = self.load_guest_rows().await?;
        Ok(rows
            .into_iter()
            .filter(|row| row.event.eq_ignore_ascii_case(event) && !row.qr_sent)
            .map(|row| {
                let mut guest = GuestRecord::new(row.name, row.email);
                if let Some(category) = GuestCategory::from_header(&row.category) {
                    guest = guest.with_category(category);
                }
                guest
            })
            .collect())
    }

    async fn mark_qr_sent(
        &self,
        event: &str,
        guests: &[GuestRecord],
    ) -> anfitrion_core::Result<()> {
        let rows = self.load_guest_rows().await?;
        let updates: Vec<(String, Vec<Vec<String>>)> = rows
            .iter()
            .filter(|row| {
                row.event.eq_ignore_ascii_case(event)
                    && guests
                        .iter()
                        .any(|g| g.email.eq_ignore_ascii_case(&row.email))
            })
            .map(|row| {
                (
                    format!("Invitados!G{}", row.sheet_row),
                    vec![vec!["TRUE".to_string()]],
                )
            })
            .collect();

        if updates.is_empty() {
            return Ok(());
        }
        let count = updates.len();
        self.batch_update(updates).await?;
        info!(event = %event, count, "guest rows marked qr-sent");
        Ok(())
    }

    async fn guest_counts(&self, event: &str) -> anfitrion_core::Result<Vec<(String, u32)>> {
        let rows = self.load_guest_rows().await?;
        let mut counts: Vec<(String, u32)> = Vec::new();
        for row in rows {
            if !row.event.eq_ignore_ascii_case(event) {
                continue;
            }
            let category = if row.category.is_empty() {
                "Sin categoría".to_string()
            } else {
                row.category
            };
            match counts.iter_mut().find(|(c, _)| *c == category) {
                Some((_, n)) => *n += 1,
                None => counts.push((category, 1)),
            }
        }
        Ok(counts)
    }
}
