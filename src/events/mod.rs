//! In-process signal bus between the native layer and the orchestrators.
//!
//! Mirrors the host's named-event model: listeners subscribe by name, the
//! native side emits a JSON payload. Handlers run synchronously inside
//! `emit`, outside the listener lock, so a handler may unlisten itself or
//! its siblings.

mod race;

pub use race::{Race, RaceBuilder, RaceError};

use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type ListenerId = u64;

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

struct Listener {
    id: ListenerId,
    event: String,
    handler: Handler,
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Failed to serialize payload for '{event}': {source}")]
    Payload {
        event: String,
        source: serde_json::Error,
    },
}

#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    listeners: Mutex<Vec<Listener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<Listener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe `handler` to `event`.
    pub fn listen<F>(&self, event: &str, handler: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.listeners().push(Listener {
            id,
            event: event.to_string(),
            handler: Arc::new(handler),
        });
        log::trace!("[EVENTS] listen '{}' -> #{}", event, id);
        id
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unlisten(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        before != listeners.len()
    }

    /// Deliver `payload` to every listener of `event` registered right now.
    pub fn emit<P: Serialize>(&self, event: &str, payload: P) -> Result<(), EventError> {
        let value = serde_json::to_value(payload).map_err(|source| EventError::Payload {
            event: event.to_string(),
            source,
        })?;
        self.emit_value(event, &value);
        Ok(())
    }

    pub fn emit_value(&self, event: &str, payload: &Value) {
        let handlers: Vec<(ListenerId, Handler)> = self
            .listeners()
            .iter()
            .filter(|l| l.event == event)
            .map(|l| (l.id, Arc::clone(&l.handler)))
            .collect();

        if handlers.is_empty() {
            log::debug!("[EVENTS] '{}' emitted with no listeners", event);
        }

        for (id, handler) in handlers {
            // An earlier handler in this batch may have removed this one.
            if self.is_listening(id) {
                handler(payload);
            }
        }
    }

    fn is_listening(&self, id: ListenerId) -> bool {
        self.listeners().iter().any(|l| l.id == id)
    }

    /// Listeners currently subscribed to `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners().iter().filter(|l| l.event == event).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn emit_reaches_only_matching_listeners() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        bus.listen("capture-done", move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        bus.emit("capture-error", "boom").unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        bus.emit("capture-done", "payload").unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unlisten_stops_delivery() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        let id = bus.listen("x", move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert!(bus.unlisten(id));
        assert!(!bus.unlisten(id));

        bus.emit("x", ()).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(bus.listener_count("x"), 0);
    }

    #[test]
    fn handler_may_unlisten_a_sibling_mid_emit() {
        let bus = Arc::new(EventBus::new());
        let hits = Arc::new(AtomicUsize::new(0));

        // Listener ids are assigned sequentially from 1.
        let weak = Arc::downgrade(&bus);
        bus.listen("x", move |_| {
            if let Some(bus) = weak.upgrade() {
                bus.unlisten(2);
            }
        });
        let h = hits.clone();
        bus.listen("x", move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit("x", ()).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
