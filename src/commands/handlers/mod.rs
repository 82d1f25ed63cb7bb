//! Per-command handler implementations
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Text commands (help, setwelcome) replace slash commands
//! - 1.0.0: Initial extraction into per-command handlers

pub mod admin;
pub mod utility;

pub use admin::AdminHandler;
pub use utility::UtilityHandler;

use std::sync::Arc;

use super::handler::TextCommandHandler;

/// Create all registered command handlers
///
/// Returns a vector of handlers ready to be registered with CommandRegistry.
pub fn create_all_handlers() -> Vec<Arc<dyn TextCommandHandler>> {
    vec![Arc::new(UtilityHandler), Arc::new(AdminHandler)]
}
