//! Process configuration loaded from environment variables
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Configurable command prefix
//! - 1.0.0: Token, settings path and log level from env

use anyhow::Result;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_SETTINGS_PATH: &str = "config.json";
pub const DEFAULT_COMMAND_PREFIX: &str = "!";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// Where the welcome settings JSON lives
    pub settings_path: PathBuf,
    pub command_prefix: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN environment variable not set"))?;

        Self::from_parts(
            discord_token,
            env::var("WELCOME_CONFIG_PATH").ok(),
            env::var("COMMAND_PREFIX").ok(),
            env::var("LOG_LEVEL").ok(),
        )
    }

    /// Build a config from raw values, applying defaults for anything missing
    pub fn from_parts(
        discord_token: String,
        settings_path: Option<String>,
        command_prefix: Option<String>,
        log_level: Option<String>,
    ) -> Result<Self> {
        if discord_token.trim().is_empty() {
            return Err(anyhow::anyhow!("DISCORD_TOKEN is empty"));
        }

        let command_prefix = command_prefix
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_COMMAND_PREFIX.to_string());
        if command_prefix.starts_with('/') {
            // Discord clients swallow `/` for slash commands
            return Err(anyhow::anyhow!(
                "COMMAND_PREFIX cannot start with '/': {command_prefix}"
            ));
        }

        Ok(Config {
            discord_token,
            settings_path: settings_path
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH)),
            command_prefix,
            log_level: log_level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}
