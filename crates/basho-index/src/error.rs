//! Error types for the index crate.

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// A persisted-store query failed.
    #[error("table store error: {0}")]
    Db(#[from] basho_db::DbError),

    /// No prefecture matches the given code or name.
    #[error("unknown prefecture: {0}")]
    UnknownPrefecture(String),

    /// No municipality matches the given code.
    #[error("unknown municipality: {0}")]
    UnknownCity(String),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
