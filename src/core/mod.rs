//! # Core Module
//!
//! Configuration, error taxonomy and text helpers shared by the welcome bot.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add typed error taxonomy for lookups, delivery and settings writes
//! - 1.1.0: Add text module with message splitting
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;
pub mod text;

pub use config::Config;
pub use error::{ConfigWriteError, DeliveryError, LookupError};
pub use text::{fallback_notice, split_for_message, MESSAGE_LIMIT};
