//! Security event sink port

use warden_domain::SecurityEvent;

/// Destination for audit events.
///
/// Publishing never fails from the caller's point of view; a sink that
/// cannot deliver must deal with it internally.
pub trait SecurityEventSink: Send + Sync {
    /// Hands one event to the sink.
    fn publish(&self, event: SecurityEvent);
}
