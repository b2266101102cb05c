use std::sync::RwLock;

use tracing::{info, warn};

use crate::event::{LedgerEvent, RecordedEvent};

/// Consumer of ledger events.
///
/// Events are observational output. A sink cannot fail the invocation that
/// emitted the event.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &LedgerEvent);
}

/// Append-only in-memory event log.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: RwLock<Vec<RecordedEvent>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a log from previously recorded events.
    pub fn from_events(events: Vec<RecordedEvent>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// The most recent `n` events, oldest first.
    pub fn latest(&self, n: usize) -> Vec<RecordedEvent> {
        let events = self.events();
        let start = events.len().saturating_sub(n);
        events[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.events.read().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for InMemoryEventLog {
    fn emit(&self, event: &LedgerEvent) {
        match self.events.write() {
            Ok(mut events) => {
                let seq = events.last().map(|e| e.seq + 1).unwrap_or(1);
                events.push(RecordedEvent::new(seq, event.clone()));
            }
            Err(_) => warn!(event = event.name(), "event log lock poisoned; event dropped"),
        }
    }
}

/// Writes each event as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &LedgerEvent) {
        let payload = serde_json::to_string(event).unwrap_or_default();
        info!(
            event = event.name(),
            account = %event.account(),
            height = event.height(),
            %payload,
            "ledger event"
        );
    }
}
