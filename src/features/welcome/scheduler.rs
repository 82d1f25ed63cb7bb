//! # Batch Scheduler
//!
//! Once per tick, lifts the debounce window anchored at the oldest queued join
//! out of the queue and hands it to the pacing worker.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.2.0: One pacing worker keeps batches in the order they were opened
//! - 1.1.0: Batches stay open until their window closes and start pacing immediately
//! - 1.0.0: Fixed-tick batching loop

use crate::features::welcome::pacer::{BatchFeed, DeliveryPacer};
use crate::features::welcome::queue::{take_window, JoinEvent, JoinQueue, DEBOUNCE_WINDOW};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use uuid::Uuid;

pub const TICK: Duration = Duration::from_secs(1);

struct OpenBatch {
    id: Uuid,
    anchor: Instant,
    size: usize,
    tx: mpsc::UnboundedSender<JoinEvent>,
}

/// Window bookkeeping for the scheduler, independent of the clock source.
pub struct Batcher {
    window: Duration,
    open: Option<OpenBatch>,
}

impl Batcher {
    pub fn new(window: Duration) -> Self {
        Self { window, open: None }
    }

    pub fn has_open_batch(&self) -> bool {
        self.open.is_some()
    }

    /// Move in-window events out of `queue` and return the batches opened on this call.
    ///
    /// A batch anchored at `anchor` accepts events with
    /// `arrived_at - anchor <= window` and is sealed once `now - anchor`
    /// exceeds the window; the next oldest event then anchors a new batch.
    pub fn advance(&mut self, queue: &mut VecDeque<JoinEvent>, now: Instant) -> Vec<BatchFeed> {
        let mut opened = Vec::new();

        loop {
            match self.open.as_mut() {
                Some(batch) => {
                    for event in take_window(queue, batch.anchor, self.window) {
                        batch.size += 1;
                        if batch.tx.send(event).is_err() {
                            warn!("[{}] Pacing task gone, dropping join", batch.id);
                        }
                    }
                    if now.saturating_duration_since(batch.anchor) <= self.window {
                        break;
                    }
                    debug!("[{}] Window closed with {} joins", batch.id, batch.size);
                    // Dropping the sender lets the pacer finish
                    self.open = None;
                }
                None => {
                    let Some(oldest) = queue.front() else { break };
                    let (tx, rx) = mpsc::unbounded_channel();
                    let id = Uuid::new_v4();
                    let anchor = oldest.arrived_at;
                    self.open = Some(OpenBatch {
                        id,
                        anchor,
                        size: 0,
                        tx,
                    });
                    opened.push(BatchFeed {
                        id,
                        anchor,
                        events: rx,
                    });
                }
            }
        }

        opened
    }
}

pub struct BatchScheduler {
    queue: JoinQueue,
    pacer: DeliveryPacer,
    tick: Duration,
    window: Duration,
}

impl BatchScheduler {
    pub fn new(queue: JoinQueue, pacer: DeliveryPacer) -> Self {
        Self {
            queue,
            pacer,
            tick: TICK,
            window: DEBOUNCE_WINDOW,
        }
    }

    /// Run forever. Per-join failures never reach this loop.
    pub async fn run(self) {
        info!(
            "⏲️ Welcome scheduler running (tick {:?}, window {:?})",
            self.tick, self.window
        );
        let feeds = spawn_pacing_worker(self.pacer.clone());
        let mut batcher = Batcher::new(self.window);
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let opened = {
                let mut queue = self.queue.lock().await;
                batcher.advance(&mut queue, Instant::now())
            };

            for feed in opened {
                info!("[{}] Opened welcome batch", feed.id);
                if let Err(rejected) = feeds.send(feed) {
                    warn!("[{}] Pacing worker gone, batch dropped", rejected.0.id);
                }
            }
        }
    }
}

/// Start the task that paces batches one after another, in the order they are sent.
pub fn spawn_pacing_worker(pacer: DeliveryPacer) -> mpsc::UnboundedSender<BatchFeed> {
    let (tx, mut rx) = mpsc::unbounded_channel::<BatchFeed>();
    tokio::spawn(async move {
        while let Some(feed) = rx.recv().await {
            pacer.pace(feed).await;
        }
        debug!("Pacing worker stopped");
    });
    tx
}
