//! # Features
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

pub mod welcome;

pub use welcome::{WelcomeService, WelcomeSettings};

/// Crate version logged on startup
pub fn get_bot_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
