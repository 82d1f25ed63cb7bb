//! Utility command handlers
//!
//! Handles: help
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Help lists commands with the configured prefix
//! - 1.0.0: Initial help command

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::commands::context::{CommandContext, CommandInvocation};
use crate::commands::handler::TextCommandHandler;

/// Handler for utility commands: help
pub struct UtilityHandler;

#[async_trait]
impl TextCommandHandler for UtilityHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["help"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        info!(
            "[{}] Help requested by {}",
            invocation.request_id, invocation.invoker
        );
        Ok(help_text(&ctx.prefix))
    }
}

pub fn help_text(prefix: &str) -> String {
    format!(
        "`{prefix}help` - this\n`{prefix}setwelcome` - admin only, reply to a message to make it the welcome"
    )
}
