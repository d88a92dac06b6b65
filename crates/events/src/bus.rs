//! Event bus abstraction.
//!
//! The coordinator publishes overlay changes through this trait so the core
//! can run headless in tests and under any presentation layer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;

/// Sink for events addressed to the presentation layer.
pub trait EventBus: Send + Sync {
    /// Emit an event with a JSON payload under `topic` (e.g. "overlay:changed").
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// A captured event from [`InMemoryEventBus`].
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Records every emitted event for later inspection.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<EmittedEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<EmittedEvent> {
        self.guard().clone()
    }

    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.guard()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Payloads for `topic`, decoded into `T`. Payloads that do not decode are skipped.
    pub fn payloads_for<T: DeserializeOwned>(&self, topic: &str) -> Vec<T> {
        self.guard()
            .iter()
            .filter(|e| e.topic == topic)
            .filter_map(|e| serde_json::from_value(e.payload.clone()).ok())
            .collect()
    }

    /// Most recent payload for `topic`, decoded into `T`.
    pub fn last_for<T: DeserializeOwned>(&self, topic: &str) -> Option<T> {
        self.guard()
            .iter()
            .rev()
            .find(|e| e.topic == topic)
            .and_then(|e| serde_json::from_value(e.payload.clone()).ok())
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.guard().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// Discards everything.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Height {
        reserved_height: f64,
    }

    #[test]
    fn test_in_memory_event_bus_filters_by_topic() {
        let bus = InMemoryEventBus::new();

        bus.emit("overlay:changed", json!({"overlay": "email_choice"}));
        bus.emit("layout:header_reserved", json!({"reserved_height": 185.0}));
        bus.emit("overlay:changed", json!({"overlay": "none"}));

        assert_eq!(bus.len(), 3);
        assert_eq!(bus.events_for("overlay:changed").len(), 2);
        assert_eq!(bus.events_for("layout:header_reserved").len(), 1);
        assert!(bus.events_for("missing").is_empty());
    }

    #[test]
    fn test_typed_payload_access() {
        let bus = InMemoryEventBus::new();
        bus.emit("layout:header_reserved", json!({"reserved_height": 184.0}));
        bus.emit("layout:header_reserved", json!({"reserved_height": 300.0}));
        bus.emit("layout:header_reserved", json!({"unexpected": true}));

        let all: Vec<Height> = bus.payloads_for("layout:header_reserved");
        assert_eq!(all.len(), 2);
        // Last payload fails to decode, so last_for yields None rather than an older value.
        assert_eq!(bus.last_for::<Height>("layout:header_reserved"), None);
    }

    #[test]
    fn test_clear() {
        let bus = InMemoryEventBus::new();
        bus.emit("overlay:changed", json!({}));
        assert!(!bus.is_empty());
        bus.clear();
        assert!(bus.is_empty());
    }

    #[test]
    fn test_null_event_bus() {
        NullEventBus.emit("overlay:changed", json!({"ignored": true}));
    }
}
