//! Discord implementation of the membership lookup and delivery channel
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.2.0: Empty welcomes fail instead of counting as sent; cut-off DMs are logged
//! - 1.1.0: Timed-out members classify as restricted
//! - 1.0.0: HTTP-backed role lookup, DMs and system-channel notices

use crate::core::error::{DeliveryError, LookupError};
use crate::core::text::split_for_message;
use crate::features::welcome::delivery::{DeliveryChannel, NoticeRef};
use crate::features::welcome::membership::{MemberRole, MembershipLookup};
use async_trait::async_trait;
use log::{debug, warn};
use serenity::http::error::Error as HttpError;
use serenity::http::Http;
use serenity::model::guild::{Member, PartialGuild};
use serenity::model::id::{GuildId, RoleId, UserId};
use serenity::Error as SerenityError;
use std::future::Future;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// JSON error code: Unknown Member
const UNKNOWN_MEMBER: isize = 10007;
/// JSON error code: Cannot send messages to this user
const CANNOT_MESSAGE_USER: isize = 50007;

#[derive(Clone)]
pub struct DiscordBackend {
    http: Arc<Http>,
}

impl DiscordBackend {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

/// Discord JSON error code and HTTP status, if the error came from the API
fn api_error(err: &SerenityError) -> Option<(isize, u16, &str)> {
    match err {
        SerenityError::Http(http_err) => match &**http_err {
            HttpError::UnsuccessfulRequest(response) => Some((
                response.error.code,
                response.status_code.as_u16(),
                response.error.message.as_str(),
            )),
            _ => None,
        },
        _ => None,
    }
}

fn classify_send_error(err: SerenityError) -> DeliveryError {
    match api_error(&err) {
        Some((CANNOT_MESSAGE_USER, _, message)) | Some((_, 403, message)) => {
            DeliveryError::Refused(message.to_string())
        }
        _ => DeliveryError::Failed(err.to_string()),
    }
}

/// Role of a present member, given what the guild says about them
pub fn classify_member(is_owner: bool, is_admin: bool, timed_out: bool) -> MemberRole {
    if is_owner {
        MemberRole::Owner
    } else if is_admin {
        MemberRole::Administrator
    } else if timed_out {
        MemberRole::Restricted
    } else {
        MemberRole::RegularMember
    }
}

/// Role for a failed member fetch: Unknown Member means the user already left
fn role_from_member_error(
    err: SerenityError,
    guild_id: GuildId,
    user_id: UserId,
) -> Result<MemberRole, LookupError> {
    match api_error(&err) {
        Some((UNKNOWN_MEMBER, _, _)) => Ok(MemberRole::Left),
        _ => Err(LookupError(format!("member {user_id} of {guild_id}: {err}"))),
    }
}

/// Send `content` to `user_id` in Discord-sized pieces, stopping at the first failure
async fn send_in_pieces<F, Fut>(
    user_id: UserId,
    content: &str,
    mut send: F,
) -> Result<(), DeliveryError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<(), DeliveryError>>,
{
    let pieces = split_for_message(content);
    if pieces.is_empty() {
        return Err(DeliveryError::Failed("welcome message is empty".into()));
    }

    let total = pieces.len();
    for (sent, piece) in pieces.into_iter().enumerate() {
        if let Err(e) = send(piece).await {
            if sent > 0 {
                warn!("Welcome DM to {user_id} cut off after {sent} of {total} parts: {e}");
            }
            return Err(e);
        }
    }
    Ok(())
}

fn has_admin_role(guild: &PartialGuild, member: &Member) -> bool {
    // @everyone shares the guild's id
    let everyone = RoleId(guild.id.0);
    member
        .roles
        .iter()
        .chain(std::iter::once(&everyone))
        .filter_map(|role_id| guild.roles.get(role_id))
        .any(|role| role.permissions.administrator())
}

fn is_timed_out(member: &Member) -> bool {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    member
        .communication_disabled_until
        .map(|until| until.unix_timestamp() > now)
        .unwrap_or(false)
}

#[async_trait]
impl MembershipLookup for DiscordBackend {
    async fn role(&self, guild_id: GuildId, user_id: UserId) -> Result<MemberRole, LookupError> {
        let guild = self
            .http
            .get_guild(guild_id.0)
            .await
            .map_err(|e| LookupError(format!("guild {guild_id}: {e}")))?;

        let member = match self.http.get_member(guild_id.0, user_id.0).await {
            Ok(member) => member,
            Err(e) => return role_from_member_error(e, guild_id, user_id),
        };

        Ok(classify_member(
            guild.owner_id == user_id,
            has_admin_role(&guild, &member),
            is_timed_out(&member),
        ))
    }
}

#[async_trait]
impl DeliveryChannel for DiscordBackend {
    async fn send_direct(&self, user_id: UserId, content: &str) -> Result<(), DeliveryError> {
        let dm = user_id
            .create_dm_channel(&*self.http)
            .await
            .map_err(classify_send_error)?;

        let channel_id = dm.id;
        let http = &self.http;
        send_in_pieces(user_id, content, move |piece| async move {
            channel_id
                .say(http, piece)
                .await
                .map(|_| ())
                .map_err(classify_send_error)
        })
        .await
    }

    async fn send_group(
        &self,
        guild_id: GuildId,
        content: &str,
    ) -> Result<NoticeRef, DeliveryError> {
        let guild = self
            .http
            .get_guild(guild_id.0)
            .await
            .map_err(|e| DeliveryError::Failed(e.to_string()))?;
        let channel_id = guild.system_channel_id.ok_or_else(|| {
            DeliveryError::Failed(format!("guild {guild_id} has no system channel"))
        })?;

        let message = channel_id
            .say(&self.http, content)
            .await
            .map_err(|e| DeliveryError::Failed(e.to_string()))?;
        debug!("Posted notice {} in channel {}", message.id, channel_id);

        Ok(NoticeRef {
            channel_id: message.channel_id,
            message_id: message.id,
        })
    }

    async fn delete_group_message(&self, notice: NoticeRef) -> Result<(), DeliveryError> {
        notice
            .channel_id
            .delete_message(&self.http, notice.message_id)
            .await
            .map_err(|e| DeliveryError::Failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::http::error::ErrorResponse;
    use serenity::http::StatusCode;
    use std::cell::RefCell;
    use url::Url;

    #[test]
    fn test_owner_wins_over_everything() {
        assert_eq!(classify_member(true, false, true), MemberRole::Owner);
        assert_eq!(classify_member(true, true, false), MemberRole::Owner);
    }

    #[test]
    fn test_admin_before_timeout() {
        assert_eq!(classify_member(false, true, true), MemberRole::Administrator);
    }

    #[test]
    fn test_timed_out_member_restricted() {
        assert_eq!(classify_member(false, false, true), MemberRole::Restricted);
        assert_eq!(classify_member(false, false, false), MemberRole::RegularMember);
    }

    #[test]
    fn test_non_api_errors_are_failures() {
        let err = classify_send_error(SerenityError::Other("socket closed"));
        assert!(matches!(err, DeliveryError::Failed(_)));
    }

    fn api_failure(status: u16, code: isize) -> SerenityError {
        let error = serde_json::from_value(serde_json::json!({
            "code": code,
            "message": "Discord said no",
        }))
        .unwrap();
        let response = ErrorResponse {
            status_code: StatusCode::from_u16(status).unwrap(),
            url: Url::parse("https://discord.com/api/v10/channels/1/messages").unwrap(),
            error,
        };
        SerenityError::from(HttpError::from(response))
    }

    #[test]
    fn test_closed_dms_are_refused() {
        let err = classify_send_error(api_failure(403, CANNOT_MESSAGE_USER));
        assert!(matches!(&err, DeliveryError::Refused(message) if message == "Discord said no"));
        assert!(err.is_refused());
    }

    #[test]
    fn test_any_forbidden_status_is_refused() {
        let err = classify_send_error(api_failure(403, 50001));
        assert!(err.is_refused());
    }

    #[test]
    fn test_server_error_is_failure() {
        let err = classify_send_error(api_failure(500, 0));
        assert!(matches!(err, DeliveryError::Failed(_)));
    }

    #[test]
    fn test_unknown_member_means_left() {
        let role = role_from_member_error(api_failure(404, UNKNOWN_MEMBER), GuildId(1), UserId(2));
        assert_eq!(role.unwrap(), MemberRole::Left);
    }

    #[test]
    fn test_other_member_errors_fail_lookup() {
        let role = role_from_member_error(api_failure(500, 0), GuildId(1), UserId(2));
        assert!(role.is_err());
    }

    #[tokio::test]
    async fn test_blank_welcome_fails_without_sending() {
        let mut calls = 0;
        let result = send_in_pieces(UserId(1), "  \n ", |_| {
            calls += 1;
            async { Ok(()) }
        })
        .await;

        assert!(matches!(result, Err(DeliveryError::Failed(_))));
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_long_welcome_sent_in_pieces() {
        let content = format!("{}\n{}", "a".repeat(1500), "b".repeat(1500));
        let sent = RefCell::new(Vec::new());

        send_in_pieces(UserId(1), &content, |piece| {
            sent.borrow_mut().push(piece);
            async { Ok(()) }
        })
        .await
        .unwrap();

        let sent = sent.into_inner();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].starts_with('a') && sent[1].starts_with('b'));
    }

    #[tokio::test]
    async fn test_failed_second_piece_reports_error() {
        let content = format!("{}\n{}", "a".repeat(1500), "b".repeat(1500));
        let sent = RefCell::new(0);

        let result = send_in_pieces(UserId(1), &content, |_| {
            *sent.borrow_mut() += 1;
            let attempt = *sent.borrow();
            async move {
                if attempt == 2 {
                    Err(DeliveryError::Failed("gateway hiccup".into()))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(matches!(result, Err(DeliveryError::Failed(_))));
        assert_eq!(*sent.borrow(), 2);
    }
}
