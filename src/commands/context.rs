//! Shared context and invocation types for command handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Reply-based text commands; invocation decoupled from the gateway message
//! - 1.0.0: Initial implementation with core shared state

use crate::features::welcome::{MembershipClassifier, SettingsStore};
use serenity::model::channel::Message;
use serenity::model::id::{GuildId, UserId};
use uuid::Uuid;

/// Shared services for all command handlers
#[derive(Clone)]
pub struct CommandContext {
    pub settings: SettingsStore,
    pub classifier: MembershipClassifier,
    pub prefix: String,
}

impl CommandContext {
    pub fn new(settings: SettingsStore, classifier: MembershipClassifier, prefix: String) -> Self {
        Self {
            settings,
            classifier,
            prefix,
        }
    }
}

/// Message the command replied to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepliedMessage {
    pub text: Option<String>,
    /// Embed description, the closest Discord has to a media caption
    pub caption: Option<String>,
}

impl RepliedMessage {
    /// Text if present, else the caption
    pub fn body(&self) -> Option<&str> {
        self.text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(self.caption.as_deref())
    }
}

/// One parsed command message
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub request_id: Uuid,
    pub name: String,
    pub guild_id: Option<GuildId>,
    pub invoker: UserId,
    /// `Some` when the command message is a reply
    pub replied: Option<RepliedMessage>,
}

impl CommandInvocation {
    pub fn from_message(name: String, msg: &Message) -> Self {
        let replied = msg.message_reference.as_ref().map(|_| {
            let original = msg.referenced_message.as_deref();
            RepliedMessage {
                text: original.map(|m| m.content.clone()),
                caption: original
                    .and_then(|m| m.embeds.first())
                    .and_then(|e| e.description.clone()),
            }
        });

        Self {
            request_id: Uuid::new_v4(),
            name,
            guild_id: msg.guild_id,
            invoker: msg.author.id,
            replied,
        }
    }
}
