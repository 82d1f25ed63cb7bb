// Core layer - config, errors and text helpers
pub mod core;

// Features layer - the welcome pipeline
pub mod features;

// Application layer
pub mod commands;

#[cfg(test)]
pub(crate) mod test_utils;

pub use core::Config;

pub use features::welcome::{
    DeliveryChannel, DeliveryOutcome, DiscordBackend, GatewayMemberEvent, IntakeDecision, JoinGate,
    MemberRole, MemberUpdate, MembershipLookup, SettingsStore, WelcomeService, WelcomeSettings,
};
