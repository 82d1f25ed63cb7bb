//! # Delivery Pacer
//!
//! Walks one batch in arrival order and spaces out the DMs so a burst of
//! joins never turns into a burst of outbound messages.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Batches share one delivery lane; spacing holds across batch boundaries
//! - 1.0.0: Initial/inter-item delays per batch

use crate::features::welcome::delivery::{DeliveryEngine, DeliveryOutcome};
use crate::features::welcome::queue::JoinEvent;
use log::{debug, info};
use serenity::model::id::UserId;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep_until, Instant};
use uuid::Uuid;

/// A batch as handed to the pacer.
///
/// Events keep arriving on `events` until the scheduler seals the batch by
/// dropping the sender.
pub struct BatchFeed {
    pub id: Uuid,
    /// Arrival of the oldest event in the batch
    pub anchor: Instant,
    pub events: mpsc::UnboundedReceiver<JoinEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceStep {
    /// Already welcomed earlier; nothing sent
    Skipped,
    Delivered(DeliveryOutcome),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PaceReport {
    pub steps: Vec<(UserId, PaceStep)>,
}

impl PaceReport {
    pub fn count(&self, step: PaceStep) -> usize {
        self.steps.iter().filter(|(_, s)| *s == step).count()
    }
}

#[derive(Clone)]
pub struct DeliveryPacer {
    engine: DeliveryEngine,
    /// Time of the last attempt on the lane; held for a whole pass
    lane: Arc<Mutex<Option<Instant>>>,
}

impl DeliveryPacer {
    pub fn new(engine: DeliveryEngine) -> Self {
        Self {
            engine,
            lane: Arc::new(Mutex::new(None)),
        }
    }

    pub fn engine(&self) -> &DeliveryEngine {
        &self.engine
    }

    /// Deliver every event of the batch, one after another.
    ///
    /// The first attempt goes out no earlier than `anchor + initialDelaySeconds`;
    /// each later one at least `batchDelaySeconds` after the previous attempt.
    /// Individual failures are logged by the engine and never end the pass.
    pub async fn pace(&self, mut feed: BatchFeed) -> PaceReport {
        let mut lane = self.lane.lock().await;
        let mut report = PaceReport::default();
        let mut last_in_batch: Option<Instant> = None;
        let mut index = 0usize;

        while let Some(event) = feed.events.recv().await {
            let position = index;
            index += 1;

            if self.engine.is_welcomed(event.user_id) {
                debug!(
                    "[{}] Skipping {} ({}), already welcomed",
                    feed.id, event.display_handle, event.user_id
                );
                report.steps.push((event.user_id, PaceStep::Skipped));
                continue;
            }

            let settings = self.engine.settings().snapshot().await;
            // The initial delay counts from the oldest join's arrival, not from
            // when this pass got the lane. A batch that queued behind another one
            // has usually served it already and only needs the batch spacing.
            let mut deadline = match last_in_batch {
                None => feed.anchor + settings.initial_delay(),
                Some(previous) => previous + settings.batch_delay(),
            };
            // Keep spacing against whatever the previous batch sent last
            if let Some(previous) = *lane {
                deadline = deadline.max(previous + settings.batch_delay());
            }
            sleep_until(deadline).await;

            let attempted_at = Instant::now();
            last_in_batch = Some(attempted_at);
            *lane = Some(attempted_at);

            let outcome = self.engine.deliver(&event).await;
            debug!(
                "[{}] #{position} {} ({}) -> {outcome}",
                feed.id, event.display_handle, event.user_id
            );
            report.steps.push((event.user_id, PaceStep::Delivered(outcome)));
        }

        info!(
            "[{}] Batch done: {} sent, {} skipped, {} total",
            feed.id,
            report.count(PaceStep::Delivered(DeliveryOutcome::Sent)),
            report.count(PaceStep::Skipped),
            report.steps.len()
        );
        report
    }
}
