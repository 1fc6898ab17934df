//! Component wiring and the serve loop

use crate::api::api_router;
use crate::server::config::AppConfig;
use anfitrion_channels::{TwilioAdapter, TwilioConfig};
use anfitrion_core::{
    AccessControl, AuthorizationStore, ChainParser, ConversationMachine, GuestParser,
    MemoryConversationStore, MessagingGateway, QrAutomation, QrDispatcher, SheetStore,
};
use anfitrion_llm::{ChatClient, LlmConfig, LlmGuestParser};
use anfitrion_qr::{QrRunnerClient, QrRunnerConfig};
use anfitrion_sheets::{SheetAuthorizationStore, SheetsClient, SheetsConfig};
use anyhow::{Context, Result};
use axum::Extension;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Wired application components
pub struct AppState {
    /// Conversation engine handling inbound messages
    pub machine: Arc<ConversationMachine>,
    /// Background QR dispatch coordinator
    pub dispatcher: Arc<QrDispatcher>,
}

/// Build every component from the configuration.
///
/// Sections absent from the file are read from the environment. The AI
/// parser is optional: without an `[llm]` section or `LLM_API_KEY` the
/// chain runs deterministic-only.
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let sheets_config = match &config.sheets {
        Some(sheets) => sheets.clone(),
        None => SheetsConfig::from_env().context("sheets configuration missing")?,
    };
    let auth_ttl = Duration::from_secs(sheets_config.cache_ttl_secs);
    let sheets_client = Arc::new(SheetsClient::new(sheets_config)?);
    let sheets: Arc<dyn SheetStore> = sheets_client.clone();

    let auth: Arc<dyn AuthorizationStore> =
        Arc::new(SheetAuthorizationStore::new(sheets_client, auth_ttl));

    let twilio_config = match &config.twilio {
        Some(twilio) => twilio.clone(),
        None => TwilioConfig::from_env().context("twilio configuration missing")?,
    };
    let gateway: Arc<dyn MessagingGateway> = Arc::new(TwilioAdapter::new(twilio_config)?);

    let qr_config = match &config.qr_runner {
        Some(qr) => qr.clone(),
        None => QrRunnerConfig::from_env().context("qr runner configuration missing")?,
    };
    let automation: Arc<dyn QrAutomation> = Arc::new(QrRunnerClient::new(qr_config)?);

    let llm_config = config.llm.clone().or_else(|| LlmConfig::from_env().ok());
    let parser: Arc<dyn GuestParser> = match llm_config {
        Some(llm) => {
            info!(model = %llm.model, "ai-assisted guest parsing enabled");
            let primary = Arc::new(LlmGuestParser::new(ChatClient::new(llm)?));
            Arc::new(ChainParser::with_primary(primary))
        }
        None => {
            info!("ai-assisted guest parsing disabled, deterministic only");
            Arc::new(ChainParser::deterministic())
        }
    };

    let access = AccessControl::new(auth.clone());
    let dispatcher = Arc::new(QrDispatcher::new(
        sheets.clone(),
        auth,
        automation,
        gateway,
    ));
    let machine = Arc::new(ConversationMachine::new(
        Arc::new(MemoryConversationStore::new()),
        sheets,
        access,
        parser,
        dispatcher.clone(),
    ));

    Ok(AppState {
        machine,
        dispatcher,
    })
}

/// Build the state, bind the listener and serve until shutdown
pub async fn run(config: AppConfig) -> Result<()> {
    let state = build_state(&config)?;

    let app = api_router()
        .layer(Extension(state.machine))
        .layer(Extension(state.dispatcher));

    let addr = config.server.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {addr}");

    axum::serve(listener, app)
        .await
        .context("server terminated")?;
    Ok(())
}
