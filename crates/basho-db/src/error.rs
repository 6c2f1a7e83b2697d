//! Error types for persisted table operations.

use thiserror::Error;

/// Errors that can occur while opening or querying a table store.
#[derive(Debug, Error)]
pub enum DbError {
    /// A required table has not been created.
    #[error("table does not exist: {0}")]
    MissingTable(String),

    /// No persisted store is configured or reachable.
    #[error("persisted store unavailable: {0}")]
    Unavailable(String),

    /// The snapshot file does not start with the expected header.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// The snapshot payload does not match its checksum.
    #[error("snapshot checksum mismatch: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch { expected: u32, computed: u32 },

    /// The snapshot was written by an incompatible format version.
    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the snapshot file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for table store results.
pub type DbResult<T> = Result<T, DbError>;
