//! Access and privilege checks
//!
//! Registration is gated by the general authorization list and, once an
//! event's automatic QR dispatch has run, by the special-privilege set.
//! Every check fails closed: an unknown phone is an unauthorized phone.

use crate::collaborators::AuthorizationStore;
use crate::error::AccessError;
use std::sync::Arc;

/// Access checks over an [`AuthorizationStore`]
pub struct AccessControl {
    auth: Arc<dyn AuthorizationStore>,
}

impl AccessControl {
    /// Create the check over a store
    #[must_use]
    pub fn new(auth: Arc<dyn AuthorizationStore>) -> Self {
        Self { auth }
    }

    /// May the phone register guests for the event right now?
    pub async fn can_register(&self, phone: &str, event: &str) -> bool {
        self.check_register(phone, event).await.is_ok()
    }

    /// Registration check with the reason for a rejection
    pub async fn check_register(&self, phone: &str, event: &str) -> Result<(), AccessError> {
        if !self.auth.is_authorized(phone).await {
            return Err(AccessError::NotAuthorized);
        }
        if self.auth.is_qr_sent(event).await && !self.auth.is_special(phone).await {
            return Err(AccessError::RegistrationClosed {
                event: event.to_string(),
            });
        }
        Ok(())
    }

    /// May the phone trigger QR dispatch? Exact match on the special set.
    pub async fn can_trigger_qr(&self, phone: &str) -> bool {
        self.auth.is_special(phone).await
    }

    /// Is the phone authorized at all?
    pub async fn is_authorized(&self, phone: &str) -> bool {
        self.auth.is_authorized(phone).await
    }
}
