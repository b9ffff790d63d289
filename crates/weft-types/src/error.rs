use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("context keys must contain at least one step")]
    EmptyKey,

    #[error("context key steps must be non-empty")]
    EmptyStep,

    #[error("unknown history mode: {0}")]
    UnknownHistoryMode(String),
}
