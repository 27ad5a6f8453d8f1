//! Periodic removal of expired entries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

/// A store whose entries lapse with time.
#[async_trait]
pub trait Expiring: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Drops every lapsed entry and returns how many were removed.
    async fn purge_expired(&self) -> usize;
}

/// Spawns a task that purges `stores` every `interval`.
///
/// The task runs until the returned handle is aborted or the runtime stops.
pub fn spawn_sweeper(stores: Vec<Arc<dyn Expiring>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(
            interval_secs = interval.as_secs(),
            stores = stores.len(),
            "Expiry sweeper started"
        );
        loop {
            tokio::time::sleep(interval).await;
            for store in &stores {
                let removed = store.purge_expired().await;
                if removed > 0 {
                    tracing::debug!(store = store.name(), removed, "Purged expired entries");
                }
            }
        }
    })
}
