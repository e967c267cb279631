use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use crate::{
    app_init::{create_poller, initialize_logging},
    config::{BotSettings, Credentials, load_settings},
};

mod app_init;
mod client;
mod config;
mod domain;
mod event;
mod id;
mod logging;
mod notice_service;
mod result;

/// Relays Practicum homework review status changes to a Telegram chat
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Settings file (TOML); defaults to the user config directory if present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds to wait between polls
    #[arg(long)]
    interval: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Dump raw API responses to disk
    #[arg(short, long)]
    debug: bool,
}

impl Cli {
    fn apply(&self, mut settings: BotSettings) -> BotSettings {
        if let Some(interval) = self.interval {
            settings.poll_interval_secs = interval;
        }
        if let Some(timeout) = self.timeout {
            settings.request_timeout_secs = timeout;
        }
        settings
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = cli.apply(load_settings(cli.config.as_deref())?);

    let log_guard = initialize_logging(&settings)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Homework bot starting up");

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!(severity = "CRITICAL", error = %e, "Required tokens are missing, stopping");
            // exit() skips destructors, flush the log file first
            drop(log_guard);
            std::process::exit(1);
        },
    };

    let poller = create_poller(&settings, &credentials, cli.debug)?;

    let shutdown = poller.shutdown_sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received");
            let _ = shutdown.send(());
        }
    });

    poller.start().await;
    Ok(())
}
