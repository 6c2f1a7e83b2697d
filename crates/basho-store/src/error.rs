/// Errors from shard sources.
///
/// [`DataStore`](crate::DataStore) never surfaces these to callers: a shard
/// that cannot be read or decoded is logged and treated as empty.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A shard could not be encoded or decoded.
    #[error("serialization error in {path}: {reason}")]
    Serialization { path: String, reason: String },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
