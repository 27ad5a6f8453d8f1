//! Audit sink that keeps events in memory.

use std::sync::Arc;

use parking_lot::Mutex;
use warden_application::ports::SecurityEventSink;
use warden_domain::{AuditOperation, SecurityEvent};

/// Collects events for later inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventSink {
    events: Arc<Mutex<Vec<SecurityEvent>>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events.lock().clone()
    }

    /// Events of one operation type.
    #[must_use]
    pub fn of(&self, operation: AuditOperation) -> Vec<SecurityEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.operation == operation)
            .cloned()
            .collect()
    }

    /// Drops all collected events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl SecurityEventSink for MemoryEventSink {
    fn publish(&self, event: SecurityEvent) {
        self.events.lock().push(event);
    }
}
