//! # Command System
//!
//! Prefixed text commands read from guild messages. `setwelcome` works on the
//! message it replies to, which slash commands cannot express.
//!
//! - **Version**: 3.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Text commands with reply support replace slash commands
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 1.0.0: Initial command structure

pub mod context;
pub mod handler;
pub mod handlers;
pub mod parser;
pub mod registry;

pub use context::{CommandContext, CommandInvocation, RepliedMessage};
pub use handler::TextCommandHandler;
pub use parser::parse_command;
pub use registry::CommandRegistry;
