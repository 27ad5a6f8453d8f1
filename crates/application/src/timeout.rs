//! Bounded store calls.

use std::future::Future;
use std::time::Duration;

use crate::{ApplicationError, ApplicationResult};

/// Runs one store call under `limit`.
///
/// A call that does not finish in time fails the operation with
/// [`ApplicationError::Timeout`]; it is never retried here.
pub(crate) async fn within<T, E>(
    limit: Duration,
    operation: &'static str,
    call: impl Future<Output = Result<T, E>>,
) -> ApplicationResult<T>
where
    ApplicationError: From<E>,
{
    if let Ok(result) = tokio::time::timeout(limit, call).await {
        result.map_err(ApplicationError::from)
    } else {
        tracing::warn!(
            operation,
            timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            "Store call timed out"
        );
        Err(ApplicationError::Timeout(operation))
    }
}
