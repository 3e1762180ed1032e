//! In-process event bus

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::entities::Event;
use crate::domain::traits::{EventBus, EventListener, ListenerId};

type Listeners = Vec<(ListenerId, Arc<dyn EventListener>)>;

/// Delivers each event to its listeners one at a time, in subscription order
pub struct LocalEventBus {
    listeners: RwLock<HashMap<String, Listeners>>,
    next_id: AtomicU64,
}

impl LocalEventBus {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Total listeners across all event names
    pub fn total_listeners(&self) -> usize {
        self.listeners
            .read()
            .map(|l| l.values().map(Vec::len).sum())
            .unwrap_or(0)
    }
}

impl Default for LocalEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for LocalEventBus {
    fn on(&self, event_name: &str, listener: Arc<dyn EventListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        listeners
            .entry(event_name.to_string())
            .or_default()
            .push((id, listener));
        id
    }

    fn off(&self, event_name: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let Some(entries) = listeners.get_mut(event_name) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            listeners.remove(event_name);
        }
        removed
    }

    async fn emit(&self, event: &Event) -> usize {
        // Snapshot so handlers may (un)subscribe while we deliver
        let targets: Listeners = match self.listeners.read() {
            Ok(listeners) => listeners.get(&event.name).cloned().unwrap_or_default(),
            Err(e) => e.into_inner().get(&event.name).cloned().unwrap_or_default(),
        };

        for (id, listener) in &targets {
            if let Err(e) = listener.on_event(event).await {
                tracing::warn!("Handler {:?} for {} failed: {}", id, event.name, e);
            }
        }
        targets.len()
    }

    fn listener_count(&self, event_name: &str) -> usize {
        self.listeners
            .read()
            .map(|l| l.get(event_name).map(Vec::len).unwrap_or(0))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use crate::application::errors::HandlerError;
    use crate::domain::entities::EventKind;

    struct Recorder {
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl EventListener for Recorder {
        async fn on_event(&self, _event: &Event) -> Result<(), HandlerError> {
            self.log.lock().unwrap().push(self.tag);
            Ok(())
        }
    }

    fn recorder(tag: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Arc<dyn EventListener> {
        Arc::new(Recorder { tag, log: log.clone() })
    }

    #[tokio::test]
    async fn test_emit_in_subscription_order() {
        let bus = LocalEventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.on("messageCreate", recorder("a", &log));
        bus.on("messageCreate", recorder("b", &log));
        bus.on("voiceStateUpdate", recorder("c", &log));

        assert_eq!(bus.emit(&Event::new(EventKind::MessageCreate)).await, 2);
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_off_removes_only_that_listener() {
        let bus = LocalEventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = bus.on("messageCreate", recorder("a", &log));
        bus.on("messageCreate", recorder("b", &log));

        assert!(bus.off("messageCreate", a));
        assert!(!bus.off("messageCreate", a));
        assert!(!bus.off("unknownEvent", a));
        assert_eq!(bus.listener_count("messageCreate"), 1);
        assert_eq!(bus.total_listeners(), 1);

        bus.emit(&Event::new(EventKind::MessageCreate)).await;
        assert_eq!(*log.lock().unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_emit_without_listeners() {
        let bus = LocalEventBus::new();
        assert_eq!(bus.emit(&Event::new(EventKind::GuildMemberRemove)).await, 0);
    }
}
