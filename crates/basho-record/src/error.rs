//! Error types for record mapping setup.

/// Errors raised while installing a mapping on a host model.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The host model cannot run a hook before records are written.
    #[error("{model} does not support before-write hooks")]
    NoBeforeWriteHook { model: String },

    /// The mapping names no target columns.
    #[error("postal mapping on {model} has no target columns")]
    EmptyMapping { model: String },

    /// A column named by the mapping does not exist on the host model.
    #[error("{model} has no column named {column}")]
    UnknownColumn { model: String, column: String },
}

/// Convenience alias for record mapping results.
pub type RecordResult<T> = Result<T, RecordError>;
