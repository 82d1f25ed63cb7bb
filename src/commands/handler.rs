//! Text command handler trait
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Handlers return the reply text instead of talking to Discord
//! - 1.0.0: Initial implementation for modular command handling

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::context::{CommandContext, CommandInvocation};

/// Trait for text command handlers
///
/// Each handler processes one or more commands and returns the reply to post.
/// Handlers are registered with a CommandRegistry and dispatched by name.
///
/// # Example
///
/// ```ignore
/// pub struct PingHandler;
///
/// #[async_trait]
/// impl TextCommandHandler for PingHandler {
///     fn command_names(&self) -> &'static [&'static str] {
///         &["ping"]
///     }
///
///     async fn handle(
///         &self,
///         ctx: Arc<CommandContext>,
///         invocation: &CommandInvocation,
///     ) -> Result<String> {
///         Ok("Pong!".to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait TextCommandHandler: Send + Sync {
    /// Command name(s) this handler processes
    fn command_names(&self) -> &'static [&'static str];

    /// Handle the command, returning the reply
    ///
    /// Rejections (missing privilege, bad input) are `Ok` replies; `Err` is
    /// reserved for unexpected failures.
    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &CommandInvocation,
    ) -> Result<String>;
}
