//! Authorization tables backed by the workbook
//!
//! The `Autorizados` tab lists phones allowed to register guests; the
//! `especial` column grants post-dispatch registration and manual QR
//! rights. Lookups are cached with a TTL and fail closed: if the sheet
//! cannot be read and the cache has expired, every phone is unauthorized.

use crate::cache::TtlCache;
use crate::client::SheetsClient;
use crate::error::Result;
use anfitrion_core::{normalize_phone, AuthorizationStore};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

const AUTHORIZED_RANGE: &str = "Autorizados!A2:B";

#[derive(Debug, Clone, Default)]
struct AuthTable {
    authorized: HashSet<String>,
    special: HashSet<String>,
}

/// Sheet-backed [`AuthorizationStore`]
pub struct SheetAuthorizationStore {
    client: Arc<SheetsClient>,
    cache: RwLock<TtlCache<AuthTable>>,
}

impl SheetAuthorizationStore {
    /// Create the store over a shared client
    #[must_use]
    pub fn new(client: Arc<SheetsClient>, cache_ttl: Duration) -> Self {
        Self {
            client,
            cache: RwLock::new(TtlCache::new(cache_ttl)),
        }
    }

    async fn load_table(&self) -> Result<AuthTable> {
        if let Some(table) = self.cache.read().await.get() {
            return Ok(table.clone());
        }

        let rows = self.client.get_values(AUTHORIZED_RANGE).await?;
        let mut table = AuthTable::default();
        for row in rows {
            let Some(raw_phone) = row.first() else {
                continue;
            };
            let phone = normalize_phone(raw_phone);
            if phone.is_empty() {
                continue;
            }
            let special = row
                .get(1)
                .is_some_and(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "sí" | "si" | "x"));
            if special {
                table.special.insert(phone.clone());
            }
            table.authorized.insert(phone);
        }

        debug!(
            authorized = table.authorized.len(),
            special = table.special.len(),
            "authorization table loaded"
        );
        self.cache.write().await.put(table.clone());
        Ok(table)
    }

    /// Fail-closed lookup: unreadable table means not present.
    async fn contains(&self, phone: &str, special_only: bool) -> bool {
        match self.load_table().await {
            Ok(table) => {
                let set = if special_only {
                    &table.special
                } else {
                    &table.authorized
                };
                set.contains(&normalize_phone(phone))
            }
            Err(e) => {
                warn!(error = %e, "authorization table unavailable, failing closed");
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl AuthorizationStore for SheetAuthorizationStore {
    async fn is_authorized(&self, phone: &str) -> bool {
        self.contains(phone, false).await
    }

    async fn is_special(&self, phone: &str) -> bool {
        self.contains(phone, true).await
    }

    async fn is_qr_sent(&self, event: &str) -> bool {
        match self.client.event_qr_sent(event).await {
            Ok(sent) => sent,
            Err(e) => {
                warn!(event = %event, error = %e, "event qr state unavailable, assuming sent");
                // Fail closed for registration: treat the window as closed
                true
            }
        }
    }

    async fn mark_qr_sent(&self, event: &str) -> anfitrion_core::Result<()> {
        self.client.set_event_qr_sent(event).await?;
        Ok(())
    }
}
