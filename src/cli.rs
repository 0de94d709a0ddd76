// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::analysis::GeminiClient;
use crate::controller::Controller;
use crate::core::{ConfigManager, FsOps};
use crate::image_ingest::ImagePayload;
use crate::session::SessionError;
use crate::types::{AnalysisResult, InputMode};
use crate::utils::{preview_for_log, report_file_path};
use crate::web::start_web_server;

#[derive(Parser)]
#[command(name = "scamguard")]
#[command(about = "Check whether a job or internship offer is legitimate")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Overrides ROCKET_PORT and the config file
        #[arg(long)]
        port: Option<u16>,
    },
    /// Analyze a single offer and print the report
    Analyze {
        #[arg(long, default_value_t = InputMode::Text)]
        mode: InputMode,
        /// Offer text, offer URL, or path to an offer image
        content: String,
        /// Print the result as JSON instead of the plain text report
        #[arg(long)]
        json: bool,
        /// Also write the report to a timestamped file in this directory
        #[arg(long)]
        save_report: Option<PathBuf>,
    },
}

pub async fn handle_command(cli: Cli, mut config: ConfigManager) -> Result<()> {
    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            start_web_server(config).await
        }

        Command::Analyze {
            mode,
            content,
            json,
            save_report,
        } => {
            let client = GeminiClient::new(&config.gemini)?;
            let controller = Controller::new(Arc::new(client));

            let result = run_analysis(&controller, mode, &content).await?;
            println!("{}", render_output(&result, json)?);

            if let Some(dir) = save_report {
                let report = controller
                    .report()
                    .await
                    .context("No report available after a successful analysis")?;
                let path = save_report_to(&dir, mode, &report).await?;
                info!("✅ Report saved to {}", path.display());
            }
            Ok(())
        }
    }
}

/// Drives one submission through a fresh session
pub async fn run_analysis(
    controller: &Controller,
    mode: InputMode,
    content: &str,
) -> Result<AnalysisResult> {
    controller.select_mode(mode).await;

    match mode {
        InputMode::Image => {
            let bytes = FsOps::read_file_bytes(Path::new(content)).await?;
            let image = ImagePayload::from_bytes(&bytes)
                .with_context(|| format!("Failed to load offer image: {}", content))?;
            info!(
                "Loaded {} image ({} bytes) from {}",
                image.mime_type, image.byte_len, content
            );
            controller.load_image(image).await?;
        }
        InputMode::Text | InputMode::Url => {
            info!("Analyzing {}: {}", mode, preview_for_log(content, 80));
            controller.set_input(content).await?;
        }
    }

    match controller.submit().await {
        Ok(result) => Ok(result),
        Err(SessionError::Analysis(cause)) => {
            error!("❌ Analysis failed: {}", cause);
            Err(anyhow::Error::new(cause).context(crate::session::ANALYSIS_FAILED_MESSAGE))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn render_output(result: &AnalysisResult, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(result).context("Failed to serialize analysis result")
    } else {
        let mut output = crate::report::render_report(result);
        if let Some(sources) = &result.grounding_sources {
            output.push_str("\n\nSources:");
            for source in sources {
                output.push_str(&format!("\n- {} ({})", source.title, source.uri));
            }
        }
        Ok(output)
    }
}

pub async fn save_report_to(dir: &Path, mode: InputMode, report: &str) -> Result<PathBuf> {
    FsOps::ensure_dir_exists(dir).await?;
    let path = report_file_path(dir, mode);
    FsOps::write_file_safe(&path, report).await?;
    Ok(path)
}
