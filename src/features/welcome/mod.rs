//! # Feature: Welcome Messages
//!
//! DMs a configurable welcome to users joining a guild. Joins arriving within
//! ten seconds of each other are batched and paced so a raid of joins does not
//! hammer the API. Users with closed DMs get a short-lived mention in the
//! guild's system channel instead.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Pacing lane shared by all batches
//! - 1.1.0: Fallback notice for users with DMs disabled
//! - 1.0.0: Debounced welcome DMs

pub mod delivery;
pub mod discord;
pub mod intake;
pub mod membership;
pub mod pacer;
pub mod queue;
pub mod scheduler;
pub mod settings;

pub use delivery::{DeliveryChannel, DeliveryEngine, DeliveryOutcome, NoticeRef, WelcomedSet};
pub use discord::DiscordBackend;
pub use intake::{GatewayMemberEvent, IntakeDecision, JoinGate, MemberUpdate};
pub use membership::{MemberRole, MembershipClassifier, MembershipLookup};
pub use pacer::{DeliveryPacer, PaceReport, PaceStep};
pub use queue::{JoinEvent, JoinQueue};
pub use scheduler::BatchScheduler;
pub use settings::{SettingsStore, WelcomeSettings};

use std::sync::Arc;
use tokio::task::JoinHandle;

/// Owner of the welcome pipeline's shared state.
///
/// Hands out handles to the intake gate, the settings store and the
/// classifier; each structure has its own lock.
#[derive(Clone)]
pub struct WelcomeService {
    queue: JoinQueue,
    welcomed: WelcomedSet,
    settings: SettingsStore,
    classifier: MembershipClassifier,
    channel: Arc<dyn DeliveryChannel>,
}

impl WelcomeService {
    pub fn new(
        settings: SettingsStore,
        lookup: Arc<dyn MembershipLookup>,
        channel: Arc<dyn DeliveryChannel>,
    ) -> Self {
        Self {
            queue: JoinQueue::new(),
            welcomed: WelcomedSet::new(),
            settings,
            classifier: MembershipClassifier::new(lookup),
            channel,
        }
    }

    /// Service backed by one Discord HTTP client for both lookups and delivery
    pub fn discord(settings: SettingsStore, backend: DiscordBackend) -> Self {
        let backend = Arc::new(backend);
        Self::new(settings, backend.clone(), backend)
    }

    pub fn gate(&self) -> JoinGate {
        JoinGate::new(self.classifier.clone(), self.queue.clone())
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn classifier(&self) -> &MembershipClassifier {
        &self.classifier
    }

    pub fn welcomed(&self) -> &WelcomedSet {
        &self.welcomed
    }

    /// Start the batching loop on the current runtime
    pub fn spawn_scheduler(&self) -> JoinHandle<()> {
        let engine = DeliveryEngine::new(
            Arc::clone(&self.channel),
            self.settings.clone(),
            self.welcomed.clone(),
        );
        let scheduler = BatchScheduler::new(self.queue.clone(), DeliveryPacer::new(engine));
        tokio::spawn(scheduler.run())
    }
}
