//! Admin command handlers
//!
//! Handles: setwelcome
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: setwelcome takes the replied-to message as the new welcome
//! - 1.0.0: Initial admin commands

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

use crate::commands::context::{CommandContext, CommandInvocation};
use crate::commands::handler::TextCommandHandler;
use crate::core::text::non_blank;

pub const GUILD_ONLY: &str = "This command can only be used in a server.";
pub const ADMIN_ONLY: &str = "❌ Admin only";
pub const PERMISSION_CHECK_FAILED: &str =
    "❌ Couldn't verify your permissions right now. Please try again.";
pub const REPLY_REQUIRED: &str = "Reply to a message with new welcome text.";
pub const EMPTY_WELCOME: &str = "❌ That message has no text to use as the welcome.";
pub const WELCOME_UPDATED: &str = "✅ Welcome updated!";

/// Handler for admin commands: setwelcome
pub struct AdminHandler;

#[async_trait]
impl TextCommandHandler for AdminHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["setwelcome"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        match invocation.name.as_str() {
            "setwelcome" => Ok(self.handle_set_welcome(&ctx, invocation).await),
            _ => Ok(String::new()),
        }
    }
}

impl AdminHandler {
    async fn handle_set_welcome(&self, ctx: &CommandContext, invocation: &CommandInvocation) -> String {
        let request_id = invocation.request_id;
        let Some(guild_id) = invocation.guild_id else {
            return GUILD_ONLY.to_string();
        };

        match ctx.classifier.is_privileged(guild_id, invocation.invoker).await {
            Ok(true) => {}
            Ok(false) => {
                info!(
                    "[{request_id}] setwelcome refused for non-admin {} in {guild_id}",
                    invocation.invoker
                );
                return ADMIN_ONLY.to_string();
            }
            Err(e) => {
                warn!("[{request_id}] setwelcome permission check failed: {e}");
                return PERMISSION_CHECK_FAILED.to_string();
            }
        }

        let Some(replied) = &invocation.replied else {
            return REPLY_REQUIRED.to_string();
        };
        let Some(text) = replied.body().and_then(non_blank) else {
            return EMPTY_WELCOME.to_string();
        };

        match ctx.settings.set_welcome_message(text).await {
            Ok(()) => {
                info!(
                    "[{request_id}] Welcome message updated by {} ({} chars)",
                    invocation.invoker,
                    text.chars().count()
                );
                WELCOME_UPDATED.to_string()
            }
            Err(e) => {
                warn!("[{request_id}] Welcome message not persisted: {e}");
                format!("⚠️ Welcome updated for now, but saving it failed: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::RepliedMessage;
    use crate::features::welcome::{MemberRole, MembershipClassifier, SettingsStore};
    use crate::test_utils::StaticMembership;
    use serenity::model::id::{GuildId, UserId};
    use uuid::Uuid;

    const ADMIN: UserId = UserId(1);
    const MEMBER: UserId = UserId(2);
    const FLAKY: UserId = UserId(3);

    fn context(settings: SettingsStore) -> Arc<CommandContext> {
        let membership = StaticMembership::new()
            .with_role(ADMIN, MemberRole::Administrator)
            .with_role(MEMBER, MemberRole::RegularMember)
            .failing_for(FLAKY);
        Arc::new(CommandContext::new(
            settings,
            MembershipClassifier::new(Arc::new(membership)),
            "!".into(),
        ))
    }

    fn invocation(invoker: UserId, replied: Option<&str>) -> CommandInvocation {
        CommandInvocation {
            request_id: Uuid::new_v4(),
            name: "setwelcome".into(),
            guild_id: Some(GuildId(10)),
            invoker,
            replied: replied.map(|text| RepliedMessage {
                text: Some(text.to_string()),
                caption: None,
            }),
        }
    }

    fn store() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::load_or_init(dir.path().join("config.json")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_admin_reply_updates_and_persists() {
        let (dir, settings) = store();
        let ctx = context(settings.clone());

        let reply = AdminHandler
            .handle(ctx, &invocation(ADMIN, Some("Hello **newcomer**")))
            .await
            .unwrap();

        assert_eq!(reply, WELCOME_UPDATED);
        assert_eq!(settings.snapshot().await.welcome_message, "Hello **newcomer**");
        let reloaded = SettingsStore::load_or_init(dir.path().join("config.json")).unwrap();
        assert_eq!(reloaded.snapshot().await.welcome_message, "Hello **newcomer**");
    }

    #[tokio::test]
    async fn test_non_admin_rejected_without_change() {
        let (_dir, settings) = store();
        let before = settings.snapshot().await;
        let ctx = context(settings.clone());

        let reply = AdminHandler
            .handle(ctx, &invocation(MEMBER, Some("hijacked")))
            .await
            .unwrap();

        assert_eq!(reply, ADMIN_ONLY);
        assert_eq!(settings.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_requires_reply() {
        let (_dir, settings) = store();
        let ctx = context(settings);

        let reply = AdminHandler.handle(ctx, &invocation(ADMIN, None)).await.unwrap();
        assert_eq!(reply, REPLY_REQUIRED);
    }

    #[tokio::test]
    async fn test_blank_text_rejected() {
        let (_dir, settings) = store();
        let before = settings.snapshot().await;
        let ctx = context(settings.clone());

        let reply = AdminHandler
            .handle(ctx, &invocation(ADMIN, Some(" \n\t ")))
            .await
            .unwrap();

        assert_eq!(reply, EMPTY_WELCOME);
        assert_eq!(settings.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_caption_used_when_text_empty() {
        let (_dir, settings) = store();
        let ctx = context(settings.clone());
        let mut inv = invocation(ADMIN, Some(""));
        inv.replied = Some(RepliedMessage {
            text: Some(String::new()),
            caption: Some("From the embed".into()),
        });

        AdminHandler.handle(ctx, &inv).await.unwrap();
        assert_eq!(settings.snapshot().await.welcome_message, "From the embed");
    }

    #[tokio::test]
    async fn test_outside_guild_rejected() {
        let (_dir, settings) = store();
        let ctx = context(settings);
        let mut inv = invocation(ADMIN, Some("hi"));
        inv.guild_id = None;

        assert_eq!(AdminHandler.handle(ctx, &inv).await.unwrap(), GUILD_ONLY);
    }

    #[tokio::test]
    async fn test_lookup_failure_rejected() {
        let (_dir, settings) = store();
        let before = settings.snapshot().await;
        let ctx = context(settings.clone());

        let reply = AdminHandler
            .handle(ctx, &invocation(FLAKY, Some("hi")))
            .await
            .unwrap();

        assert_eq!(reply, PERMISSION_CHECK_FAILED);
        assert_eq!(settings.snapshot().await, before);
    }
}
