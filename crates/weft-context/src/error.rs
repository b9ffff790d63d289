use weft_store::StoreError;
use weft_tree::TreeError;
use weft_types::ContextHash;

/// Errors from context and repository operations.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// Error surfaced by the backing store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Error surfaced by the tree layer.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// A stored commit record cannot be decoded.
    #[error("corrupt commit {hash}: {reason}")]
    CorruptCommit { hash: ContextHash, reason: String },

    /// Serialization failure while encoding a commit record.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The genesis patch hook failed.
    #[error("patch context hook failed: {0}")]
    Patch(String),
}

/// Result alias for context operations.
pub type ContextResult<T> = Result<T, ContextError>;
