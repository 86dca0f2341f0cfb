use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::models::Instrument;

/// Runtime configuration, assembled once at startup.
///
/// Credentials come from the process environment (optionally via `.env`);
/// everything else has a default. Base-URL overrides exist for the practice
/// broker endpoint and for tests.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Telegram bot token
    pub telegram_token: String,
    /// OANDA REST API bearer token
    pub oanda_token: String,
    /// Address the webhook server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Path to the instrument list JSON file
    #[serde(default = "default_instruments_path")]
    pub instruments_path: String,
    /// Broker API base override
    #[serde(default)]
    pub oanda_api_base: Option<String>,
    /// Telegram API base override
    #[serde(default)]
    pub telegram_api_base: Option<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_instruments_path() -> String {
    "instruments.json".to_string()
}

impl Config {
    /// Load configuration from the environment (TELEGRAM_TOKEN, OANDA_TOKEN,
    /// LISTEN_ADDR, INSTRUMENTS_PATH, OANDA_API_BASE, TELEGRAM_API_BASE)
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("Failed to read configuration from environment")?;

        settings
            .try_deserialize()
            .context("Invalid configuration: TELEGRAM_TOKEN and OANDA_TOKEN are required")
    }
}

/// Load the instrument list walked by the `/price` command
pub fn load_instruments<P: AsRef<Path>>(path: P) -> Result<Vec<Instrument>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read instrument list {}", path.display()))?;

    parse_instruments(&raw).with_context(|| format!("Invalid instrument list {}", path.display()))
}

fn parse_instruments(raw: &str) -> Result<Vec<Instrument>> {
    let instruments: Vec<Instrument> = serde_json::from_str(raw)?;
    Ok(instruments)
}
