use bazaar_shared::models::events::MarketEvent;
use std::sync::Mutex;
use tracing::{info, warn};

/// Destination for domain events. Publishing never fails the caller.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: MarketEvent);
}

/// Emits events as structured log lines under the `bazaar::events` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, event: MarketEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(target: "bazaar::events", kind = event.kind(), %payload, "event published"),
            Err(e) => warn!(target: "bazaar::events", kind = event.kind(), "Failed to serialize event: {}", e),
        }
    }
}

/// Keeps every published event in memory.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<MarketEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MarketEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for RecordingEventSink {
    fn publish(&self, event: MarketEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
