//! Audit sink writing to `tracing`.

use tracing::{error, info, warn};
use warden_application::ports::SecurityEventSink;
use warden_domain::{AuditLevel, SecurityEvent};

/// Log target of audit events.
pub const AUDIT_TARGET: &str = "security_audit";

/// Emits every event as one structured log line under [`AUDIT_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl TracingEventSink {
    /// Creates the sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SecurityEventSink for TracingEventSink {
    fn publish(&self, event: SecurityEvent) {
        let SecurityEvent {
            operation,
            user,
            message,
            ip,
            level,
            timestamp,
        } = event;
        let operation = operation.as_str();
        let timestamp = timestamp.to_rfc3339();
        match level {
            AuditLevel::Info => {
                info!(target: AUDIT_TARGET, operation, user, ip, timestamp, "{message}");
            }
            AuditLevel::Warn => {
                warn!(target: AUDIT_TARGET, operation, user, ip, timestamp, "{message}");
            }
            AuditLevel::Error => {
                error!(target: AUDIT_TARGET, operation, user, ip, timestamp, "{message}");
            }
        }
    }
}
