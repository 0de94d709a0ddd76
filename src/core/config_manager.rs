// src/core/config_manager.rs
//! Startup configuration: optional `config.yaml` sections plus environment overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const DEFAULT_MODEL: &str = "gemini-flash-latest";
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub gemini: GeminiConfig,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub port: u16,
    /// Sessions untouched for this long are dropped
    pub session_idle_seconds: u64,
    pub max_sessions: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            session_idle_seconds: DEFAULT_SESSION_IDLE_SECS,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: Option<EnvironmentSection>,
    #[serde(default)]
    production: Option<EnvironmentSection>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvironmentSection {
    #[serde(default)]
    gemini: Option<GeminiSection>,
    #[serde(default)]
    server: Option<ServerSection>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiSection {
    model: Option<String>,
    base_url: Option<String>,
    temperature: Option<f32>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    port: Option<u16>,
    session_idle_seconds: Option<u64>,
    max_sessions: Option<usize>,
}

impl ConfigManager {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` for every environment variable
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("SCAMGUARD_ENV")
            .or_else(|| lookup("ENVIRONMENT"))
            .unwrap_or_else(|| "local".to_string());
        info!("Loading configuration for environment: {}", environment);

        let config_path = lookup("SCAMGUARD_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.yaml"));
        let section = Self::load_section(&config_path, &environment)?;

        let mut gemini = GeminiConfig::default();
        let mut server = ServerSettings::default();

        if let Some(file_gemini) = section.gemini {
            if let Some(model) = file_gemini.model {
                gemini.model = model;
            }
            if let Some(base_url) = file_gemini.base_url {
                gemini.base_url = base_url;
            }
            if let Some(temperature) = file_gemini.temperature {
                gemini.temperature = temperature;
            }
            if let Some(timeout) = file_gemini.timeout_seconds {
                gemini.timeout_seconds = timeout;
            }
        }
        if let Some(file_server) = section.server {
            if let Some(port) = file_server.port {
                server.port = port;
            }
            if let Some(idle) = file_server.session_idle_seconds {
                server.session_idle_seconds = idle;
            }
            if let Some(max) = file_server.max_sessions {
                server.max_sessions = max;
            }
        }

        gemini.api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("VITE_GEMINI_API_KEY"))
            .filter(|key| !key.trim().is_empty());
        if let Some(model) = lookup("GEMINI_MODEL") {
            gemini.model = model;
        }
        if let Some(base_url) = lookup("GEMINI_API_URL") {
            gemini.base_url = base_url;
        }
        if let Some(timeout) = lookup("GEMINI_TIMEOUT_SECS") {
            gemini.timeout_seconds = timeout
                .parse()
                .context("GEMINI_TIMEOUT_SECS must be a number of seconds")?;
        }
        if let Some(port) = lookup("ROCKET_PORT") {
            server.port = port
                .parse()
                .context("ROCKET_PORT must be a valid port number")?;
        }
        if let Some(idle) = lookup("SCAMGUARD_SESSION_IDLE_SECS") {
            server.session_idle_seconds = idle
                .parse()
                .context("SCAMGUARD_SESSION_IDLE_SECS must be a number of seconds")?;
        }
        if let Some(max) = lookup("SCAMGUARD_MAX_SESSIONS") {
            server.max_sessions = max
                .parse()
                .context("SCAMGUARD_MAX_SESSIONS must be a positive number")?;
        }

        if gemini.api_key.is_none() {
            error!("GEMINI_API_KEY is not defined in environment variables");
        }

        Ok(Self {
            environment,
            gemini,
            server,
        })
    }

    fn load_section(path: &Path, environment: &str) -> Result<EnvironmentSection> {
        if !path.exists() {
            info!("No {} found, using defaults", path.display());
            return Ok(EnvironmentSection::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let section = match environment {
            "production" => file.production,
            _ => file.local,
        };

        Ok(section.unwrap_or_else(|| {
            warn!(
                "{} has no '{}' section, using defaults",
                path.display(),
                environment
            );
            EnvironmentSection::default()
        }))
    }

    pub fn has_credentials(&self) -> bool {
        self.gemini.api_key.is_some()
    }
}
