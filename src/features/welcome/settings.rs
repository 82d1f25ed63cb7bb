//! File-backed welcome settings with write-through updates
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.2.0: Refuse to start with a blank welcome message
//! - 1.1.0: Accept legacy snake_case keys (`welcome_message`, `delay_seconds`, `batch_delay`)
//! - 1.0.0: JSON settings file with defaults written on first start

use crate::core::error::ConfigWriteError;
use anyhow::{bail, Context as _, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

pub const DEFAULT_WELCOME_MESSAGE: &str = "👋 **Welcome to the server!**\n\
📌 Please read the rules in the pinned messages before posting.\n\
💬 Introduce yourself: *Name + Country*\n\
Use `!help` to see what I can do.";
pub const DEFAULT_INITIAL_DELAY_SECONDS: u64 = 7;
pub const DEFAULT_BATCH_DELAY_SECONDS: u64 = 2;

/// Operator-tunable welcome behaviour, persisted as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeSettings {
    /// Markdown body of the welcome DM
    #[serde(alias = "welcome_message")]
    pub welcome_message: String,

    /// Wait before the first delivery of a batch
    #[serde(alias = "delay_seconds", default = "default_initial_delay")]
    pub initial_delay_seconds: u64,

    /// Wait between deliveries inside a batch
    #[serde(alias = "batch_delay", default = "default_batch_delay")]
    pub batch_delay_seconds: u64,
}

fn default_initial_delay() -> u64 {
    DEFAULT_INITIAL_DELAY_SECONDS
}

fn default_batch_delay() -> u64 {
    DEFAULT_BATCH_DELAY_SECONDS
}

impl Default for WelcomeSettings {
    fn default() -> Self {
        Self {
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            initial_delay_seconds: DEFAULT_INITIAL_DELAY_SECONDS,
            batch_delay_seconds: DEFAULT_BATCH_DELAY_SECONDS,
        }
    }
}

impl WelcomeSettings {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_seconds)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_secs(self.batch_delay_seconds)
    }
}

/// Shared handle to the live settings.
///
/// Readers always see the latest value; every mutation is written to disk
/// before the call returns.
#[derive(Clone)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    current: Arc<RwLock<WelcomeSettings>>,
}

impl SettingsStore {
    /// Load settings from `path`, writing the defaults there if the file is missing
    pub fn load_or_init(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let settings = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let settings: WelcomeSettings = serde_json::from_str(&contents)
                .with_context(|| format!("parsing {}", path.display()))?;
            if settings.welcome_message.trim().is_empty() {
                bail!("{}: welcomeMessage is empty", path.display());
            }
            info!("📄 Loaded welcome settings from {}", path.display());
            settings
        } else {
            let settings = WelcomeSettings::default();
            write_settings(&path, &settings)?;
            info!(
                "📄 No settings at {} - wrote defaults",
                path.display()
            );
            settings
        };

        Ok(Self {
            path: Some(path),
            current: Arc::new(RwLock::new(settings)),
        })
    }

    /// In-memory store that never touches disk
    pub fn in_memory(settings: WelcomeSettings) -> Self {
        Self {
            path: None,
            current: Arc::new(RwLock::new(settings)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Copy of the current settings
    pub async fn snapshot(&self) -> WelcomeSettings {
        self.current.read().await.clone()
    }

    /// Replace the welcome message and persist.
    ///
    /// On a write failure the new message stays in effect for this process and
    /// the error is returned so the caller can tell the admin.
    pub async fn set_welcome_message(&self, text: &str) -> Result<(), ConfigWriteError> {
        let mut settings = self.current.write().await;
        settings.welcome_message = text.to_string();

        if let Some(path) = &self.path {
            if let Err(e) = write_settings(path, &settings) {
                warn!("Welcome message updated in memory but not persisted: {e}");
                return Err(e);
            }
        }
        Ok(())
    }
}

fn write_settings(path: &Path, settings: &WelcomeSettings) -> Result<(), ConfigWriteError> {
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json).map_err(|source| ConfigWriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}
