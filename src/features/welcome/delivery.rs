//! # Delivery Engine
//!
//! One welcome attempt per join: DM the user, remember who was welcomed, and
//! fall back to a short-lived notice in the guild when the DM is refused.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.2.0: Fallback notices are deleted by a scoped cleanup task
//! - 1.1.0: Distinguish refused DMs from other failures
//! - 1.0.0: Direct welcome with dedupe

use crate::core::error::DeliveryError;
use crate::core::text::fallback_notice;
use crate::features::welcome::queue::JoinEvent;
use crate::features::welcome::settings::SettingsStore;
use async_trait::async_trait;
use dashmap::DashSet;
use log::{debug, error, info, warn};
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// How long a fallback notice stays visible
pub const NOTICE_TTL: Duration = Duration::from_secs(30);

/// Location of a message posted in a guild channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeRef {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

/// Outbound message transport
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// DM `content` to the user (markdown allowed)
    async fn send_direct(&self, user_id: UserId, content: &str) -> Result<(), DeliveryError>;

    /// Post `content` where the whole guild can see it
    async fn send_group(&self, guild_id: GuildId, content: &str)
        -> Result<NoticeRef, DeliveryError>;

    async fn delete_group_message(&self, notice: NoticeRef) -> Result<(), DeliveryError>;
}

/// Users who already received a direct welcome during this process lifetime
#[derive(Clone, Default)]
pub struct WelcomedSet {
    users: Arc<DashSet<UserId>>,
}

impl WelcomedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.users.contains(&user_id)
    }

    /// Returns false if the user was already present
    pub fn insert(&self, user_id: UserId) -> bool {
        self.users.insert(user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    RefusedFallbackSent,
    RefusedFallbackFailed,
    Error,
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeliveryOutcome::Sent => "sent",
            DeliveryOutcome::RefusedFallbackSent => "refused, notice posted",
            DeliveryOutcome::RefusedFallbackFailed => "refused, notice failed",
            DeliveryOutcome::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct DeliveryEngine {
    channel: Arc<dyn DeliveryChannel>,
    settings: SettingsStore,
    welcomed: WelcomedSet,
    notice_ttl: Duration,
}

impl DeliveryEngine {
    pub fn new(
        channel: Arc<dyn DeliveryChannel>,
        settings: SettingsStore,
        welcomed: WelcomedSet,
    ) -> Self {
        Self {
            channel,
            settings,
            welcomed,
            notice_ttl: NOTICE_TTL,
        }
    }

    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn is_welcomed(&self, user_id: UserId) -> bool {
        self.welcomed.contains(user_id)
    }

    /// Make exactly one delivery attempt for this join. Never retries.
    pub async fn deliver(&self, event: &JoinEvent) -> DeliveryOutcome {
        let welcome = self.settings.snapshot().await.welcome_message;

        match self.channel.send_direct(event.user_id, &welcome).await {
            Ok(()) => {
                self.welcomed.insert(event.user_id);
                info!(
                    "✉️ Welcomed {} ({}) in guild {}",
                    event.display_handle, event.user_id, event.guild_id
                );
                DeliveryOutcome::Sent
            }
            Err(DeliveryError::Refused(reason)) => {
                warn!(
                    "DMs closed for {} ({}): {reason}",
                    event.display_handle, event.user_id
                );
                self.post_fallback_notice(event).await
            }
            Err(e) => {
                error!(
                    "Failed to welcome {} ({}): {e}",
                    event.display_handle, event.user_id
                );
                DeliveryOutcome::Error
            }
        }
    }

    async fn post_fallback_notice(&self, event: &JoinEvent) -> DeliveryOutcome {
        let notice = match self
            .channel
            .send_group(event.guild_id, &fallback_notice(event.user_id))
            .await
        {
            Ok(notice) => notice,
            Err(e) => {
                debug!(
                    "Fallback notice for {} in guild {} failed: {e}",
                    event.user_id, event.guild_id
                );
                return DeliveryOutcome::RefusedFallbackFailed;
            }
        };

        let channel = Arc::clone(&self.channel);
        let ttl = self.notice_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            // The message may already be gone
            if let Err(e) = channel.delete_group_message(notice).await {
                debug!("Could not delete fallback notice {}: {e}", notice.message_id);
            }
        });

        DeliveryOutcome::RefusedFallbackSent
    }
}
