//! Pending join events and the debounce window
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Window selection no longer assumes the queue is sorted
//! - 1.0.0: Mutex-guarded join queue

use serenity::model::id::{GuildId, UserId};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

/// How far after the oldest queued join another join may arrive and still share its batch
pub const DEBOUNCE_WINDOW: Duration = Duration::from_secs(10);

/// A user joining a guild, as accepted by the intake gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEvent {
    pub user_id: UserId,
    pub guild_id: GuildId,
    /// Username at join time, for logs
    pub display_handle: String,
    pub arrived_at: Instant,
}

impl JoinEvent {
    pub fn new(user_id: UserId, guild_id: GuildId, display_handle: impl Into<String>) -> Self {
        Self::arrived(user_id, guild_id, display_handle, Instant::now())
    }

    pub fn arrived(
        user_id: UserId,
        guild_id: GuildId,
        display_handle: impl Into<String>,
        arrived_at: Instant,
    ) -> Self {
        Self {
            user_id,
            guild_id,
            display_handle: display_handle.into(),
            arrived_at,
        }
    }
}

/// Shared FIFO of joins waiting to be batched
#[derive(Clone, Default)]
pub struct JoinQueue {
    events: Arc<Mutex<VecDeque<JoinEvent>>>,
}

impl JoinQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn enqueue(&self, event: JoinEvent) {
        self.events.lock().await.push_back(event);
    }

    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.lock().await.is_empty()
    }

    /// Exclusive access for a read-modify-write pass
    pub(crate) async fn lock(&self) -> MutexGuard<'_, VecDeque<JoinEvent>> {
        self.events.lock().await
    }
}

/// Remove and return every event that arrived within `window` of `anchor`.
///
/// Relative arrival order is preserved; events outside the window stay queued.
pub fn take_window(
    queue: &mut VecDeque<JoinEvent>,
    anchor: Instant,
    window: Duration,
) -> Vec<JoinEvent> {
    let in_window =
        |event: &JoinEvent| event.arrived_at.saturating_duration_since(anchor) <= window;

    let mut taken = Vec::new();
    let mut kept = VecDeque::with_capacity(queue.len());
    for event in queue.drain(..) {
        if in_window(&event) {
            taken.push(event);
        } else {
            kept.push_back(event);
        }
    }
    *queue = kept;

    taken.sort_by_key(|event| event.arrived_at);
    taken
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_at(user: u64, base: Instant, secs: u64) -> JoinEvent {
        JoinEvent::arrived(UserId(user), GuildId(1), format!("user{user}"), base + Duration::from_secs(secs))
    }

    #[tokio::test]
    async fn test_enqueue_preserves_order() {
        let queue = JoinQueue::new();
        let base = Instant::now();
        queue.enqueue(event_at(1, base, 0)).await;
        queue.enqueue(event_at(2, base, 1)).await;

        let guard = queue.lock().await;
        let users: Vec<_> = guard.iter().map(|e| e.user_id).collect();
        assert_eq!(users, vec![UserId(1), UserId(2)]);
    }

    #[test]
    fn test_take_window_includes_boundary() {
        let base = Instant::now();
        let mut queue: VecDeque<_> = vec![event_at(1, base, 0), event_at(2, base, 10)].into();

        let batch = take_window(&mut queue, base, DEBOUNCE_WINDOW);
        assert_eq!(batch.len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_take_window_leaves_late_events() {
        let base = Instant::now();
        let mut queue: VecDeque<_> = vec![
            event_at(1, base, 0),
            event_at(2, base, 4),
            event_at(3, base, 11),
            event_at(4, base, 12),
        ]
        .into();

        let batch = take_window(&mut queue, base, DEBOUNCE_WINDOW);
        let taken: Vec<_> = batch.iter().map(|e| e.user_id.0).collect();
        let left: Vec<_> = queue.iter().map(|e| e.user_id.0).collect();
        assert_eq!(taken, vec![1, 2]);
        assert_eq!(left, vec![3, 4]);
    }

    #[test]
    fn test_take_window_sorts_by_arrival() {
        let base = Instant::now();
        let mut queue: VecDeque<_> = vec![event_at(2, base, 3), event_at(1, base, 1)].into();

        let batch = take_window(&mut queue, base, DEBOUNCE_WINDOW);
        let taken: Vec<_> = batch.iter().map(|e| e.user_id.0).collect();
        assert_eq!(taken, vec![1, 2]);
    }
}
