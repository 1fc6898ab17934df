use crate::error::{Error, Result};
use serde::Deserialize;

/// Twilio WhatsApp configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TwilioConfig {
    /// Account SID (from the Twilio console)
    pub account_sid: String,
    /// Auth token
    pub auth_token: String,
    /// The bot's WhatsApp-enabled number, digits only
    pub from_number: String,
    /// API base URL (override for testing)
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "https://api.twilio.com".to_string()
}

impl TwilioConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID")
            .map_err(|_| Error::InvalidConfig("TWILIO_ACCOUNT_SID not set".to_string()))?;

        let auth_token = std::env::var("TWILIO_AUTH_TOKEN")
            .map_err(|_| Error::InvalidConfig("TWILIO_AUTH_TOKEN not set".to_string()))?;

        let from_number = std::env::var("TWILIO_WHATSAPP_NUMBER")
            .map_err(|_| Error::InvalidConfig("TWILIO_WHATSAPP_NUMBER not set".to_string()))?;

        Ok(Self::new(account_sid, auth_token, from_number))
    }

    /// Create with required fields
    #[must_use]
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: anfitrion_core::normalize_phone(&from_number.into()),
            base_url: default_base_url(),
        }
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// URL of the messages endpoint for this account
    pub(crate) fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }
}
