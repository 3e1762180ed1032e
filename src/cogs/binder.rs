//! Handler binder - attaches cog event handlers to the host bus and detaches them exactly

use async_trait::async_trait;
use libloading::Library;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use crate::application::errors::HandlerError;
use crate::cogs::trait_def::{CogContext, EventHandler};
use crate::domain::entities::Event;
use crate::domain::traits::{EventBus, EventListener, ListenerId};

/// Proof of one live binding. Only the owning loaded cog holds it.
#[derive(Debug, PartialEq, Eq)]
pub struct BindingHandle {
    event: String,
    listener: ListenerId,
    owner: String,
}

impl BindingHandle {
    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }
}

/// A handler paired with the context of the cog it belongs to
struct BoundHandler {
    handler: Arc<dyn EventHandler>,
    ctx: CogContext,
    // Keeps the cog's code mapped while a delivery is in flight; dropped after `handler`
    _library: Option<Arc<Library>>,
}

#[async_trait]
impl EventListener for BoundHandler {
    async fn on_event(&self, event: &Event) -> Result<(), HandlerError> {
        self.handler
            .handle(event, &self.ctx)
            .await
            .map_err(|e| HandlerError(format!("cog '{}': {}", self.ctx.cog_id, e)))
    }
}

pub struct HandlerBinder {
    bus: Arc<dyn EventBus>,
    live: Mutex<HashSet<ListenerId>>,
}

impl HandlerBinder {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self {
            bus,
            live: Mutex::new(HashSet::new()),
        }
    }

    /// Register `handler` for `event_name`, running with the owning cog's context.
    /// `library` is the shared object the handler's code lives in, if any.
    pub fn bind(
        &self,
        event_name: &str,
        handler: Arc<dyn EventHandler>,
        ctx: &CogContext,
        library: Option<Arc<Library>>,
    ) -> BindingHandle {
        let listener = Arc::new(BoundHandler {
            handler,
            ctx: ctx.clone(),
            _library: library,
        });
        let id = self.bus.on(event_name, listener);
        self.live.lock().unwrap_or_else(PoisonError::into_inner).insert(id);
        debug!("Bound {} handler for cog {} ({:?})", event_name, ctx.cog_id, id);

        BindingHandle {
            event: event_name.to_string(),
            listener: id,
            owner: ctx.cog_id.clone(),
        }
    }

    /// Reverse a binding. A second call with the same handle is a no-op.
    pub fn unbind(&self, handle: &BindingHandle) -> bool {
        let was_live = self
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle.listener);
        if !was_live {
            return false;
        }

        if !self.bus.off(&handle.event, handle.listener) {
            warn!("Listener {:?} for {} was already gone from the bus", handle.listener, handle.event);
        }
        debug!("Unbound {} handler for cog {}", handle.event, handle.owner);
        true
    }

    /// Number of bindings currently live across all cogs
    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
