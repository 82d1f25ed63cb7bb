//! Intake gate between the gateway's member events and the join queue
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.2.0: Members still in membership screening join once, when screening is passed
//! - 1.1.0: Ignore bot accounts
//! - 1.0.0: Status filter and privilege check

use crate::features::welcome::membership::{MemberRole, MembershipClassifier};
use crate::features::welcome::queue::{JoinEvent, JoinQueue};
use log::{debug, warn};
use serenity::model::id::{GuildId, UserId};

/// A membership change as reported by the gateway
#[derive(Debug, Clone)]
pub struct MemberUpdate {
    pub user_id: UserId,
    pub guild_id: GuildId,
    pub display_handle: String,
    pub is_bot: bool,
    pub new_status: MemberRole,
}

/// Gateway member event, reduced to what decides whether it reaches the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMemberEvent {
    /// `pending` while the member has not passed membership screening
    Added { pending: bool },
    /// `was_pending` is `None` when the previous state was not cached
    Updated { was_pending: Option<bool>, pending: bool },
    Removed,
    Banned,
}

impl GatewayMemberEvent {
    /// Status to hand to the gate, or `None` if the event is not forwarded.
    ///
    /// A member of a guild with screening joins when screening is passed,
    /// not when they first appear.
    pub fn forwarded_status(self) -> Option<MemberRole> {
        match self {
            Self::Added { pending: false } => Some(MemberRole::RegularMember),
            Self::Added { pending: true } => None,
            Self::Updated {
                was_pending: Some(true),
                pending: false,
            } => Some(MemberRole::RegularMember),
            Self::Updated { .. } => None,
            Self::Removed => Some(MemberRole::Left),
            Self::Banned => Some(MemberRole::Banned),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeDecision {
    Queued,
    /// Not a transition into membership (left, banned, timed out)
    IgnoredStatus(MemberRole),
    IgnoredBot,
    /// Owners and administrators are never welcomed
    Privileged,
    /// Lookup failed; dropped rather than risk messaging a privileged account
    LookupFailed,
}

#[derive(Clone)]
pub struct JoinGate {
    classifier: MembershipClassifier,
    queue: JoinQueue,
}

impl JoinGate {
    pub fn new(classifier: MembershipClassifier, queue: JoinQueue) -> Self {
        Self { classifier, queue }
    }

    /// Decide whether the update becomes a queued join. Dropped updates are not retried.
    pub async fn admit(&self, update: MemberUpdate) -> IntakeDecision {
        if !update.new_status.is_joined() {
            debug!(
                "Ignoring {} ({}) in guild {}: status {}",
                update.display_handle, update.user_id, update.guild_id, update.new_status
            );
            return IntakeDecision::IgnoredStatus(update.new_status);
        }

        if update.is_bot {
            debug!("Ignoring bot account {}", update.user_id);
            return IntakeDecision::IgnoredBot;
        }

        match self
            .classifier
            .is_privileged(update.guild_id, update.user_id)
            .await
        {
            Ok(true) => {
                debug!(
                    "Not welcoming privileged user {} in guild {}",
                    update.user_id, update.guild_id
                );
                return IntakeDecision::Privileged;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(
                    "Dropping join of {} in guild {}: {e}",
                    update.user_id, update.guild_id
                );
                return IntakeDecision::LookupFailed;
            }
        }

        self.queue
            .enqueue(JoinEvent::new(
                update.user_id,
                update.guild_id,
                update.display_handle,
            ))
            .await;
        debug!("Queued join of {} in guild {}", update.user_id, update.guild_id);
        IntakeDecision::Queued
    }
}
