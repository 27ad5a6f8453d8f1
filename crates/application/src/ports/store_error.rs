//! Store error type shared by the storage ports.

/// Errors reported by store adapters.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with a failure.
    #[error("store operation failed: {0}")]
    Backend(String),

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}
