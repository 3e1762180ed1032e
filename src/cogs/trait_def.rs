//! Cog contract - the static description a pluggable module hands to the registry

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::application::errors::{CommandError, HandlerError, InitError, LoadError};
use crate::cogs::guild_scope::GuildScope;
use crate::domain::entities::{Event, Invocation};

/// Host handles passed to every cog instance
#[derive(Clone)]
pub struct HostContext {
    pub bot_name: String,
    pub prefix: String,
    pub guilds: GuildScope,
}

/// Per-instance state of a loaded cog. A reload starts from an empty one.
#[derive(Debug, Default)]
pub struct CogState {
    values: RwLock<HashMap<String, serde_json::Value>>,
}

impl CogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.values.read().ok()?.get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: serde_json::Value) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.into(), value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What init hooks, executors and handlers receive instead of a bound receiver
#[derive(Clone)]
pub struct CogContext {
    pub cog_id: String,
    pub host: HostContext,
    pub state: Arc<CogState>,
}

/// Optional setup run once per load
#[async_trait]
pub trait CogInit: Send + Sync {
    async fn init(&self, ctx: &CogContext) -> Result<(), InitError>;
}

#[async_trait]
impl<F> CogInit for F
where
    F: Fn(&CogContext) -> Result<(), InitError> + Send + Sync,
{
    async fn init(&self, ctx: &CogContext) -> Result<(), InitError> {
        self(ctx)
    }
}

/// Runs a command invocation and produces the reply text
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, invocation: &Invocation, ctx: &CogContext) -> Result<String, CommandError>;
}

#[async_trait]
impl<F> CommandExecutor for F
where
    F: Fn(&Invocation, &CogContext) -> Result<String, CommandError> + Send + Sync,
{
    async fn execute(&self, invocation: &Invocation, ctx: &CogContext) -> Result<String, CommandError> {
        self(invocation, ctx)
    }
}

/// Reacts to a host event
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &Event, ctx: &CogContext) -> Result<(), HandlerError>;
}

#[async_trait]
impl<F> EventHandler for F
where
    F: Fn(&Event, &CogContext) -> Result<(), HandlerError> + Send + Sync,
{
    async fn handle(&self, event: &Event, ctx: &CogContext) -> Result<(), HandlerError> {
        self(event, ctx)
    }
}

/// A command contributed by a cog
#[derive(Clone)]
pub struct CommandSpec {
    pub name: String,
    pub description: Option<String>,
    pub usage: Option<String>,
    pub executor: Option<Arc<dyn CommandExecutor>>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            usage: None,
            executor: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn with_executor<F>(mut self, executor: F) -> Self
    where
        F: Fn(&Invocation, &CogContext) -> Result<String, CommandError> + Send + Sync + 'static,
    {
        self.executor = Some(Arc::new(executor));
        self
    }

    pub fn with_async_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Reason this spec cannot be registered, if any. Names are matched
    /// verbatim, so any non-empty name is accepted.
    pub fn invalid_reason(&self) -> Option<&'static str> {
        if self.name.is_empty() {
            Some("missing name")
        } else if self.executor.is_none() {
            Some("missing executor")
        } else {
            None
        }
    }
}

/// An event subscription contributed by a cog
#[derive(Clone)]
pub struct EventSpec {
    pub name: String,
    pub handler: Option<Arc<dyn EventHandler>>,
}

impl EventSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handler: None,
        }
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Event, &CogContext) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn with_async_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handler = Some(handler);
        self
    }
}

/// Everything a cog contributes. Only `id` is required.
#[derive(Clone, Default)]
pub struct CogDescriptor {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub init: Option<Arc<dyn CogInit>>,
    pub commands: Vec<CommandSpec>,
    pub events: Vec<EventSpec>,
}

impl CogDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_init<F>(mut self, init: F) -> Self
    where
        F: Fn(&CogContext) -> Result<(), InitError> + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(init));
        self
    }

    pub fn with_async_init(mut self, init: Arc<dyn CogInit>) -> Self {
        self.init = Some(init);
        self
    }

    pub fn with_command(mut self, command: CommandSpec) -> Self {
        self.commands.push(command);
        self
    }

    pub fn with_event(mut self, event: EventSpec) -> Self {
        self.events.push(event);
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or("No description")
    }

    /// Structural check performed before anything is registered
    pub fn validate(&self, origin: &str) -> Result<(), LoadError> {
        if self.id.trim().is_empty() {
            return Err(LoadError::InvalidDescriptor(format!("missing id in {}", origin)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &Invocation, _: &CogContext) -> Result<String, CommandError> {
        Ok(String::new())
    }

    #[test]
    fn test_descriptor_without_id_is_rejected() {
        let desc = CogDescriptor::new("").with_name("Nameless");
        assert!(matches!(desc.validate("cogs/nameless"), Err(LoadError::InvalidDescriptor(_))));
        assert!(CogDescriptor::new("   ").validate("x").is_err());
        assert!(CogDescriptor::new("economy").validate("x").is_ok());
    }

    #[test]
    fn test_display_fallbacks() {
        let desc = CogDescriptor::new("music");
        assert_eq!(desc.display_name(), "music");
        assert_eq!(desc.description_or_default(), "No description");

        let desc = desc.with_name("Music").with_description("Playback");
        assert_eq!(desc.display_name(), "Music");
        assert_eq!(desc.description_or_default(), "Playback");
    }

    #[test]
    fn test_command_spec_validation() {
        assert_eq!(CommandSpec::new("").with_executor(noop).invalid_reason(), Some("missing name"));
        assert_eq!(CommandSpec::new("balance").invalid_reason(), Some("missing executor"));
        assert!(CommandSpec::new("daily-bonus").with_executor(noop).invalid_reason().is_none());
        assert!(CommandSpec::new("Balance").with_executor(noop).invalid_reason().is_none());
        assert!(CommandSpec::new("x".repeat(40)).with_executor(noop).invalid_reason().is_none());
    }

    #[test]
    fn test_cog_state_is_per_instance() {
        let a = CogState::new();
        let b = CogState::new();
        a.set("client", serde_json::json!("host"));
        assert_eq!(a.get("client"), Some(serde_json::json!("host")));
        assert!(b.get("client").is_none());
        assert!(b.is_empty());
    }
}
