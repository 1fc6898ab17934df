//! HTTP client for the portal automation runner

use crate::error::{Error, Result};
use anfitrion_core::{GuestRecord, QrDispatchReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Automation runner configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QrRunnerConfig {
    /// Runner base URL, e.g. `http://localhost:8700`
    pub base_url: String,
    /// Optional bearer token for the runner API
    #[serde(default)]
    pub api_token: Option<String>,
    /// Request timeout in seconds; runs drive a browser and take minutes
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    600
}

impl QrRunnerConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("QR_RUNNER_URL")
            .map_err(|_| Error::InvalidConfig("QR_RUNNER_URL not set".to_string()))?;

        let mut config = Self::new(base_url);
        if let Ok(token) = std::env::var("QR_RUNNER_TOKEN") {
            config.api_token = Some(token);
        }
        Ok(config)
    }

    /// Create with a base URL and defaults
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the bearer token
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    fn run_url(&self) -> String {
        format!("{}/api/v1/run", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    event: &'a str,
    guests: Vec<RunGuest<'a>>,
}

#[derive(Debug, Serialize)]
struct RunGuest<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    processed: u32,
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the external QR portal automation runner
///
/// The runner logs into the ticketing portal with a headless browser,
/// registers each guest and lets the portal email the QR code. This
/// client only submits the batch and relays the completion report.
pub struct QrRunnerClient {
    config: QrRunnerConfig,
    client: reqwest::Client,
}

impl QrRunnerClient {
    /// Create a new client
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: QrRunnerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        Self::new(QrRunnerConfig::from_env()?)
    }

    /// Submit a guest batch and wait for the runner's report
    pub async fn run(&self, event: &str, guests: &[GuestRecord]) -> Result<QrDispatchReport> {
        let request = RunRequest {
            event,
            guests: guests
                .iter()
                .map(|g| RunGuest {
                    name: &g.name,
                    email: &g.email,
                })
                .collect(),
        };
        debug!(event, guests = guests.len(), "submitting automation run");

        let mut builder = self.client.post(self.config.run_url()).json(&request);
        if let Some(token) = &self.config.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("automation request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Run(format!("runner returned {status}: {body}")));
        }

        let report: RunResponse = response
            .json()
            .await
            .map_err(|e| Error::Run(format!("invalid runner response: {e}")))?;

        if let Some(error) = report.error {
            return Err(Error::Run(error));
        }

        info!(event, processed = report.processed, "automation run completed");
        Ok(QrDispatchReport {
            processed_count: report.processed,
            completed_at: report.completed_at.unwrap_or_else(Utc::now),
        })
    }
}

#[async_trait::async_trait]
impl anfitrion_core::QrAutomation for QrRunnerClient {
    async fn trigger(
        &self,
        event: &str,
        guests: &[GuestRecord],
    ) -> anfitrion_core::Result<QrDispatchReport> {
        self.run(event, guests)
            .await
            .map_err(|e| anfitrion_core::Error::Automation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_url_trims_trailing_slash() {
        let config = QrRunnerConfig::new("http://localhost:8700/");
        assert_eq!(config.run_url(), "http://localhost:8700/api/v1/run");
    }

    #[test]
    fn test_run_request_serialization() {
        let guests = vec![GuestRecord::new("Juan Pérez", "juan@ejemplo.com")];
        let request = RunRequest {
            event: "Boda",
            guests: guests
                .iter()
                .map(|g| RunGuest {
                    name: &g.name,
                    email: &g.email,
                })
                .collect(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"event":"Boda","guests":[{"name":"Juan Pérez","email":"juan@ejemplo.com"}]}"#
        );
    }

    #[test]
    fn test_run_response_decoding() {
        let json = r#"{"processed":12,"completed_at":"2025-03-01T12:00:00Z"}"#;
        let report: RunResponse = serde_json::from_str(json).unwrap();
        assert_eq!(report.processed, 12);
        assert!(report.completed_at.is_some());
        assert!(report.error.is_none());
    }

    #[test]
    fn test_run_response_error_field() {
        let json = r#"{"processed":0,"completed_at":null,"error":"portal login failed"}"#;
        let report: RunResponse = serde_json::from_str(json).unwrap();
        assert_eq!(report.error.as_deref(), Some("portal login failed"));
    }
}
