use weft_store::StoreError;
use weft_types::ObjectId;

/// Errors from tree operations.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Error surfaced by the backing store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A node referenced by id is not present in the store.
    #[error("missing node {0} (referenced but not in store)")]
    Missing(ObjectId),

    /// A persisted node cannot be decoded.
    #[error("corrupt node {id}: {reason}")]
    Corrupt { id: ObjectId, reason: String },

    /// Serialization failure while encoding a node.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
