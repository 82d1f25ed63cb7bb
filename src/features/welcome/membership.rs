//! Membership roles and the privilege check
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::core::error::LookupError;
use async_trait::async_trait;
use serenity::model::id::{GuildId, UserId};
use std::fmt;
use std::sync::Arc;

/// Where a user currently stands in a guild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberRole {
    Owner,
    Administrator,
    RegularMember,
    /// Present but timed out
    Restricted,
    Left,
    Banned,
}

impl MemberRole {
    /// Owners and administrators are exempt from welcomes
    pub fn is_privileged(self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Administrator)
    }

    /// Statuses that count as having joined the guild
    pub fn is_joined(self) -> bool {
        matches!(
            self,
            MemberRole::Owner | MemberRole::Administrator | MemberRole::RegularMember
        )
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemberRole::Owner => "owner",
            MemberRole::Administrator => "administrator",
            MemberRole::RegularMember => "member",
            MemberRole::Restricted => "restricted",
            MemberRole::Left => "left",
            MemberRole::Banned => "banned",
        };
        f.write_str(name)
    }
}

/// Source of truth for a user's role in a guild
#[async_trait]
pub trait MembershipLookup: Send + Sync {
    async fn role(&self, guild_id: GuildId, user_id: UserId) -> Result<MemberRole, LookupError>;
}

/// Answers "is this user an owner or administrator?"
#[derive(Clone)]
pub struct MembershipClassifier {
    lookup: Arc<dyn MembershipLookup>,
}

impl MembershipClassifier {
    pub fn new(lookup: Arc<dyn MembershipLookup>) -> Self {
        Self { lookup }
    }

    pub async fn is_privileged(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<bool, LookupError> {
        Ok(self.lookup.role(guild_id, user_id).await?.is_privileged())
    }
}
