use std::path::PathBuf;

use weft_types::ObjectId;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store path could not be opened or created.
    #[error("cannot open store at {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    /// Operation attempted after `close`.
    #[error("store is closed")]
    Closed,

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error surfaced by the sled backend.
    #[error("backend error: {0}")]
    Backend(#[from] sled::Error),

    /// The object data is malformed or cannot be decoded.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// Attempted to write a null object ID.
    #[error("cannot store object with null ID")]
    NullObjectId,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
