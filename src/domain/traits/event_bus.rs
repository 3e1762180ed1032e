use async_trait::async_trait;
use std::sync::Arc;
use crate::application::errors::HandlerError;
use crate::domain::entities::Event;

/// Opaque id of a listener registered with an event bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Something the bus can deliver events to
#[async_trait]
pub trait EventListener: Send + Sync {
    async fn on_event(&self, event: &Event) -> Result<(), HandlerError>;
}

/// Host event bus - the only surface cogs' handlers are attached to
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Subscribe `listener` to events named `event_name`
    fn on(&self, event_name: &str, listener: Arc<dyn EventListener>) -> ListenerId;

    /// Remove a subscription. Returns false if it was not registered.
    fn off(&self, event_name: &str, id: ListenerId) -> bool;

    /// Deliver an event to its listeners, returning how many were invoked
    async fn emit(&self, event: &Event) -> usize;

    /// Number of live listeners for an event name
    fn listener_count(&self, event_name: &str) -> usize;
}
