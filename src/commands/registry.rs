//! Command handler registry
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Dispatch helper for parsed invocations
//! - 1.0.0: Initial implementation for handler dispatch

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

use super::context::{CommandContext, CommandInvocation};
use super::handler::TextCommandHandler;
use super::handlers::create_all_handlers;

/// Registry mapping command names to handlers
///
/// Multiple command names can map to the same handler if they share logic.
#[derive(Clone)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn TextCommandHandler>>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry with every built-in command
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for handler in create_all_handlers() {
            registry.register(handler);
        }
        registry
    }

    /// Register a handler for its declared command names
    pub fn register(&mut self, handler: Arc<dyn TextCommandHandler>) {
        for name in handler.command_names() {
            self.handlers.insert(name, Arc::clone(&handler));
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TextCommandHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered command names
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the matching handler; `None` when the command is unknown
    pub async fn dispatch(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &CommandInvocation,
    ) -> Option<Result<String>> {
        let handler = self.get(&invocation.name)?;
        Some(handler.handle(ctx, invocation).await)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
