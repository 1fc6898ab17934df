use super::config::TwilioConfig;
use crate::error::{Error, Result};
use crate::phone::to_whatsapp_address;
use serde::Deserialize;
use tracing::{debug, info};

/// Twilio WhatsApp adapter
pub struct TwilioAdapter {
    config: TwilioConfig,
    client: reqwest::Client,
}

/// Subset of the Twilio message resource we care about
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: Option<String>,
    error_code: Option<i64>,
    error_message: Option<String>,
}

impl TwilioAdapter {
    /// Create a new Twilio adapter
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: TwilioConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        info!("Twilio WhatsApp adapter initialized");

        Ok(Self { config, client })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = TwilioConfig::from_env()?;
        Self::new(config)
    }

    /// Send a WhatsApp text message through the Twilio Messages API
    pub async fn send_text(&self, to_digits: &str, body: &str) -> Result<String> {
        let params = [
            ("From", to_whatsapp_address(&self.config.from_number)),
            ("To", to_whatsapp_address(to_digits)),
            ("Body", body.to_string()),
        ];

        let response = self
            .client
            .post(self.config.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to send message: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Twilio(format!("API returned {status}: {body}")));
        }

        let resource: MessageResource = response
            .json()
            .await
            .map_err(|e| Error::Twilio(format!("Invalid API response: {e}")))?;

        if let Some(code) = resource.error_code {
            return Err(Error::Twilio(format!(
                "API error {}: {}",
                code,
                resource.error_message.unwrap_or_default()
            )));
        }

        let sid = resource.sid.unwrap_or_default();
        debug!(to = %to_digits, sid = %sid, "whatsapp message sent");
        Ok(sid)
    }
}

#[async_trait::async_trait]
impl anfitrion_core::MessagingGateway for TwilioAdapter {
    async fn send_message(&self, phone: &str, text: &str) -> anfitrion_core::Result<()> {
        self.send_text(phone, text)
            .await
            .map(|_| ())
            .map_err(|e| anfitrion_core::Error::MessageSend(e.to_string()))
    }
}
