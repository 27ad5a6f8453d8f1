//! Security audit trail of sensitive operations.

use std::future::Future;
use std::sync::Arc;

use warden_domain::audit::UNKNOWN;
use warden_domain::{AuditLevel, AuditOperation, SecurityEvent, UserId, format_origin};

use crate::auth::RequestContext;
use crate::ports::{Clock, SecurityEventSink};
use crate::{ApplicationError, ApplicationResult};

/// Records the outcome of audited operations.
///
/// Successes are `INFO`, expected authentication failures `WARN`, anything
/// else `ERROR`. Actor and origin always come from the [`RequestContext`].
/// Recording never changes the outcome it observes.
#[derive(Clone)]
pub struct SecurityAudit {
    sink: Arc<dyn SecurityEventSink>,
    clock: Arc<dyn Clock>,
}

impl SecurityAudit {
    /// Creates an audit trail writing to `sink`.
    pub fn new(sink: Arc<dyn SecurityEventSink>, clock: Arc<dyn Clock>) -> Self {
        Self { sink, clock }
    }

    /// Awaits `call` and records its outcome under `operation`.
    ///
    /// # Errors
    /// Whatever `call` returns.
    pub async fn observe<T, F>(
        &self,
        operation: AuditOperation,
        ctx: &RequestContext,
        call: F,
    ) -> ApplicationResult<T>
    where
        F: Future<Output = ApplicationResult<T>>,
    {
        let result = call.await;
        self.record_outcome(operation, ctx, &result);
        result
    }

    /// Records an already computed outcome.
    pub fn record_outcome<T>(
        &self,
        operation: AuditOperation,
        ctx: &RequestContext,
        result: &ApplicationResult<T>,
    ) {
        match result {
            Ok(_) => self.emit(operation, ctx.actor(), ctx, AuditLevel::Info, "Success".to_string()),
            Err(error) => self.record_failure(operation, ctx, error),
        }
    }

    /// Records a failure of `operation`.
    pub fn record_failure(&self, operation: AuditOperation, ctx: &RequestContext, error: &ApplicationError) {
        let (level, message) = if error.is_expected() {
            (AuditLevel::Warn, format!("Fail: {error}"))
        } else {
            (AuditLevel::Error, format!("Error: {error}"))
        };
        self.emit(operation, ctx.actor(), ctx, level, message);
    }

    /// Records that `user_id` exhausted the budget behind `key`.
    pub fn rate_limited(&self, ctx: &RequestContext, user_id: &UserId, key: &str) {
        self.emit(
            AuditOperation::RateLimitExceeded,
            Some(user_id),
            ctx,
            AuditLevel::Warn,
            format!("Rate limit exceeded: {key}"),
        );
    }

    fn emit(
        &self,
        operation: AuditOperation,
        actor: Option<&UserId>,
        ctx: &RequestContext,
        level: AuditLevel,
        message: String,
    ) {
        self.sink.publish(SecurityEvent {
            operation,
            user: actor.map_or_else(|| UNKNOWN.to_string(), ToString::to_string),
            message,
            ip: format_origin(ctx.origin()),
            level,
            timestamp: self.clock.now(),
        });
    }
}
