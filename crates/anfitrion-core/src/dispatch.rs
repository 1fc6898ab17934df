//! Background QR dispatch
//!
//! QR automation runs against a third-party portal and can take minutes;
//! it never runs on the request path. `spawn` returns immediately and the
//! run reports completion (or failure) to the requesting phone through the
//! messaging gateway. In-flight runs are lost on process restart.

use crate::collaborators::{AuthorizationStore, MessagingGateway, QrAutomation, SheetStore};
use crate::error::Result;
use crate::messages;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Coordinates QR automation runs across open events
pub struct QrDispatcher {
    sheets: Arc<dyn SheetStore>,
    auth: Arc<dyn AuthorizationStore>,
    automation: Arc<dyn QrAutomation>,
    gateway: Arc<dyn MessagingGateway>,
}

impl QrDispatcher {
    /// Create a dispatcher over its collaborators
    #[must_use]
    pub fn new(
        sheets: Arc<dyn SheetStore>,
        auth: Arc<dyn AuthorizationStore>,
        automation: Arc<dyn QrAutomation>,
        gateway: Arc<dyn MessagingGateway>,
    ) -> Self {
        Self {
            sheets,
            auth,
            automation,
            gateway,
        }
    }

    /// Start a dispatch run in the background and return immediately.
    ///
    /// `notify_phone` receives per-event completion messages; `event_filter`
    /// restricts the run to one event (case-insensitive name match).
    pub fn spawn(
        self: &Arc<Self>,
        notify_phone: Option<String>,
        event_filter: Option<String>,
        dry_run: bool,
    ) {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = dispatcher
                .run(notify_phone.as_deref(), event_filter.as_deref(), dry_run)
                .await
            {
                error!(error = %e, "qr dispatch run failed");
                if let Some(phone) = notify_phone.as_deref() {
                    dispatcher.notify(phone, messages::apology()).await;
                }
            }
        });
    }

    /// Run the dispatch to completion. Per-event failures are reported and
    /// logged; they do not abort the remaining events.
    #[instrument(skip(self))]
    pub async fn run(
        &self,
        notify_phone: Option<&str>,
        event_filter: Option<&str>,
        dry_run: bool,
    ) -> Result<u32> {
        let events = self.sheets.open_events().await?;
        let mut total = 0u32;

        for event in events {
            if let Some(filter) = event_filter {
                if !event.eq_ignore_ascii_case(filter) {
                    continue;
                }
            }

            let pending = match self.sheets.qr_pending(&event).await {
                Ok(pending) => pending,
                Err(e) => {
                    error!(event = %event, error = %e, "failed to load pending guests");
                    if let Some(phone) = notify_phone {
                        self.notify(phone, messages::qr_failed(&event)).await;
                    }
                    continue;
                }
            };

            if pending.is_empty() {
                info!(event = %event, "no guests pending qr dispatch");
                continue;
            }

            if dry_run {
                info!(event = %event, pending = pending.len(), "dry run, skipping automation");
                if let Some(phone) = notify_phone {
                    self.notify(phone, messages::qr_dry_run(&event, pending.len()))
                        .await;
                }
                continue;
            }

            match self.automation.trigger(&event, &pending).await {
                Ok(report) => {
                    info!(
                        event = %event,
                        processed = report.processed_count,
                        "qr dispatch completed"
                    );
                    total += report.processed_count;

                    // Sheet first (audit trail), then the gating flag. The
                    // automation already ran; a bookkeeping failure is
                    // reported but not rolled back.
                    if let Err(e) = self.sheets.mark_qr_sent(&event, &pending).await {
                        error!(event = %event, error = %e, "failed to mark guest rows as sent");
                    }
                    if let Err(e) = self.auth.mark_qr_sent(&event).await {
                        error!(event = %event, error = %e, "failed to flag event qr dispatch");
                    }

                    if let Some(phone) = notify_phone {
                        self.notify(phone, messages::qr_done(&event, report.processed_count))
                            .await;
                    }
                }
                Err(e) => {
                    error!(event = %event, error = %e, "qr automation failed");
                    if let Some(phone) = notify_phone {
                        self.notify(phone, messages::qr_failed(&event)).await;
                    }
                }
            }
        }

        Ok(total)
    }

    async fn notify(&self, phone: &str, text: String) {
        if let Err(e) = self.gateway.send_message(phone, &text).await {
            warn!(phone = %phone, error = %e, "failed to deliver qr dispatch notice");
        }
    }
}
