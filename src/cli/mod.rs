//! CLI module for Anfitrion
//!
//! Commands:
//! - `serve`: start the webhook server (default when no command is given)
//! - `dispatch-qr`: run one QR dispatch pass in the foreground and exit

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Anfitrion guest-list assistant CLI
#[derive(Parser, Debug)]
#[command(name = "anfitrion")]
#[command(about = "WhatsApp guest-list assistant for events")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the webhook server (default)
    Serve,
    /// Run one QR dispatch pass and exit
    DispatchQr {
        /// Only process the named event
        #[arg(long)]
        event: Option<String>,
        /// Report pending guests without triggering the portal
        #[arg(long)]
        dry_run: bool,
        /// Phone number to notify with per-event results
        #[arg(long)]
        notify: Option<String>,
    },
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = crate::server::load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::DispatchQr {
            event,
            dry_run,
            notify,
        }) => {
            let state = crate::server::build_state(&config)?;
            let processed = state
                .dispatcher
                .run(notify.as_deref(), event.as_deref(), dry_run)
                .await?;
            info!(processed, "qr dispatch finished");
            Ok(())
        }
        Some(Commands::Serve) | None => crate::server::run(config).await,
    }
}
