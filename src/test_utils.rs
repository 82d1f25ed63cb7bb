//! Shared in-memory doubles for the Discord collaborators.

use crate::core::error::{DeliveryError, LookupError};
use crate::features::welcome::delivery::{DeliveryChannel, NoticeRef};
use crate::features::welcome::membership::{MemberRole, MembershipLookup};
use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;

/// Channel used for every fallback notice
pub const NOTICE_CHANNEL: ChannelId = ChannelId(500);

/// Membership answers from a fixed table; unknown users are regular members.
#[derive(Default)]
pub struct StaticMembership {
    roles: HashMap<UserId, MemberRole>,
    failing: HashSet<UserId>,
}

impl StaticMembership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, user_id: UserId, role: MemberRole) -> Self {
        self.roles.insert(user_id, role);
        self
    }

    pub fn failing_for(mut self, user_id: UserId) -> Self {
        self.failing.insert(user_id);
        self
    }
}

#[async_trait]
impl MembershipLookup for StaticMembership {
    async fn role(&self, _guild_id: GuildId, user_id: UserId) -> Result<MemberRole, LookupError> {
        if self.failing.contains(&user_id) {
            return Err(LookupError(format!("lookup for {user_id} unavailable")));
        }
        Ok(self
            .roles
            .get(&user_id)
            .copied()
            .unwrap_or(MemberRole::RegularMember))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Direct {
        user_id: UserId,
        content: String,
        at: Instant,
    },
    Group {
        guild_id: GuildId,
        notice: NoticeRef,
        content: String,
        at: Instant,
    },
}

/// Records every outbound call; failures are configured per user.
#[derive(Default)]
pub struct RecordingChannel {
    refused: HashSet<UserId>,
    failing: HashSet<UserId>,
    fail_group: bool,
    fail_delete: bool,
    next_message: AtomicU64,
    sent: Mutex<Vec<Sent>>,
    deleted: Mutex<Vec<NoticeRef>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing_dm(mut self, user_id: UserId) -> Self {
        self.refused.insert(user_id);
        self
    }

    pub fn failing_dm(mut self, user_id: UserId) -> Self {
        self.failing.insert(user_id);
        self
    }

    pub fn failing_group(mut self) -> Self {
        self.fail_group = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Successful DMs as (user, time sent)
    pub fn direct_messages(&self) -> Vec<(UserId, Instant)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Direct { user_id, at, .. } => Some((user_id, at)),
                Sent::Group { .. } => None,
            })
            .collect()
    }

    pub fn group_notices(&self) -> Vec<(NoticeRef, String)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Group { notice, content, .. } => Some((notice, content)),
                Sent::Direct { .. } => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<NoticeRef> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryChannel for RecordingChannel {
    async fn send_direct(&self, user_id: UserId, content: &str) -> Result<(), DeliveryError> {
        if self.refused.contains(&user_id) {
            return Err(DeliveryError::Refused("Cannot send messages to this user".into()));
        }
        if self.failing.contains(&user_id) {
            return Err(DeliveryError::Failed("500 Internal Server Error".into()));
        }
        self.sent.lock().unwrap().push(Sent::Direct {
            user_id,
            content: content.to_string(),
            at: Instant::now(),
        });
        Ok(())
    }

    async fn send_group(
        &self,
        guild_id: GuildId,
        content: &str,
    ) -> Result<NoticeRef, DeliveryError> {
        if self.fail_group {
            return Err(DeliveryError::Failed("Missing Permissions".into()));
        }
        let notice = NoticeRef {
            channel_id: NOTICE_CHANNEL,
            message_id: MessageId(self.next_message.fetch_add(1, Ordering::SeqCst) + 1),
        };
        self.sent.lock().unwrap().push(Sent::Group {
            guild_id,
            notice,
            content: content.to_string(),
            at: Instant::now(),
        });
        Ok(notice)
    }

    async fn delete_group_message(&self, notice: NoticeRef) -> Result<(), DeliveryError> {
        if self.fail_delete {
            return Err(DeliveryError::Failed("Unknown Message".into()));
        }
        self.deleted.lock().unwrap().push(notice);
        Ok(())
    }
}
