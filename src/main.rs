use anyhow::{Context, Result};
use clap::Parser;
use scamguard::cli::{handle_command, Cli};
use scamguard::core::ConfigManager;
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_DIRECTIVES: &str = "scamguard=info,rocket=warn";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_DIRECTIVES))
        .context("Invalid log directive")?;

    let file_layer = match std::env::var("SCAMGUARD_LOG_FILE") {
        Ok(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true) // Clear file on startup
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        Err(_) => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    let cli = Cli::parse();

    // Load configuration using unified ConfigManager
    let config = ConfigManager::load()?;
    info!("Environment: {}", config.environment);

    handle_command(cli, config).await
}
