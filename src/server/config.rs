//! Server configuration types
//!
//! Each collaborator section reuses the owning crate's config struct, so a
//! TOML file and the environment describe the same settings. Sections left
//! out of the file fall back to environment variables at wiring time.

use anfitrion_channels::TwilioConfig;
use anfitrion_llm::LlmConfig;
use anfitrion_qr::QrRunnerConfig;
use anfitrion_sheets::SheetsConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;

/// Default config file looked up when `--config` is not given
const DEFAULT_CONFIG_FILE: &str = "anfitrion.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Google Sheets backend; `SHEETS_*` env vars when absent
    #[serde(default)]
    pub sheets: Option<SheetsConfig>,
    /// Twilio WhatsApp gateway; `TWILIO_*` env vars when absent
    #[serde(default)]
    pub twilio: Option<TwilioConfig>,
    /// Optional AI-assisted parsing; deterministic-only when absent
    /// and `LLM_API_KEY` is unset
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    /// QR portal automation runner; `QR_RUNNER_*` env vars when absent
    #[serde(default)]
    pub qr_runner: Option<QrRunnerConfig>,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Resolve the bind address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

/// Load configuration from a TOML file, or defaults when no file exists
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = match path {
        Some(path) => path,
        None => Path::new(DEFAULT_CONFIG_FILE),
    };

    if !path.exists() {
        info!("no config file at {}, using environment", path.display());
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;

    info!("loaded configuration from {}", path.display());
    Ok(config)
}
