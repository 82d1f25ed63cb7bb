//! Error taxonomy for the welcome pipeline
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! Glue code (startup, command dispatch) stays on `anyhow::Result`; these
//! types are what the core components hand back to each other.

use std::path::PathBuf;
use thiserror::Error;

/// The membership query itself failed (network, API, missing guild).
#[derive(Debug, Error)]
#[error("membership lookup failed: {0}")]
pub struct LookupError(pub String);

/// Outcome classification of a failed remote send.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The recipient cannot be reached by direct message (DMs closed or the bot is blocked).
    #[error("direct delivery refused: {0}")]
    Refused(String),

    /// Any other failure: transport, rate limit, unknown channel.
    #[error("delivery failed: {0}")]
    Failed(String),
}

impl DeliveryError {
    pub fn is_refused(&self) -> bool {
        matches!(self, DeliveryError::Refused(_))
    }
}

/// Persisting the settings file failed. The in-memory change is kept.
#[derive(Debug, Error)]
pub enum ConfigWriteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}
