use weft_context::ContextError;
use weft_store::StoreError;
use weft_tree::TreeError;
use weft_types::ContextHash;

/// Errors from snapshot export/import.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Error surfaced by the backing store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Error surfaced by the tree layer.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Error surfaced by the context layer.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// I/O error reading or writing the snapshot file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure on a record payload.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The file does not start with the snapshot magic.
    #[error("invalid snapshot magic: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    /// The file's format version is not supported.
    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),

    /// A record is malformed or the stream ends mid-record.
    #[error("corrupt snapshot at offset {offset}: {reason}")]
    Corrupt { offset: u64, reason: String },

    /// A record's CRC does not match its payload.
    #[error("CRC mismatch at offset {offset}")]
    CrcMismatch { offset: u64 },

    /// The trailing whole-stream checksum does not match.
    #[error("stream checksum mismatch")]
    ChecksumMismatch,

    /// An ancestor referenced during export could not be located; the dump
    /// is aborted and no partial file is published.
    #[error("dump walk failed at {hash}: {reason}")]
    DumpWalk { hash: ContextHash, reason: String },

    /// A recomputed context hash does not match the recorded one. The
    /// destination index must be treated as inconsistent.
    #[error("integrity mismatch: expected {expected}, computed {computed}")]
    IntegrityMismatch {
        expected: ContextHash,
        computed: ContextHash,
    },

    /// A caller-supplied restore hook failed.
    #[error("restore hook failed: {0}")]
    Hook(String),
}

/// Result alias for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;
