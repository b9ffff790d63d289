//! Streaming snapshot export/import for the Weft context store.
//!
//! A snapshot file carries a chain of commits -- block rows plus the tree
//! nodes reachable from their commits -- in one ordered, integrity-checked
//! stream that can be replayed linearly into a fresh index on another
//! node.
//!
//! # File format
//!
//! ```text
//! magic "WEFTSNAP" | version (u32 BE) | history mode byte
//! then, oldest block first:
//!   block record   -- header, metadata, optional pruned summary, commit info
//!   node records   -- every tree node of that commit not already emitted
//!                     earlier in the stream (structural sharing: shared
//!                     nodes appear exactly once, so the oldest block
//!                     carries the one full tree and later blocks only
//!                     their unique nodes)
//! end marker, then a BLAKE3 checksum of everything before it
//! ```
//!
//! Every record is zstd-compressed and CRC32-framed. [`dump_contexts`]
//! writes the stream through a temp file so no partial dump is ever
//! published; [`restore_contexts`] re-derives every commit hash as it
//! rebuilds and fails with an integrity error -- leaving the destination
//! suspect -- on any mismatch.

pub mod error;
pub mod export;
pub mod import;
pub mod records;
mod stream;

pub use error::{SnapshotError, SnapshotResult};
pub use export::{dump_contexts, BlockData, BlockProvider, DumpReport};
pub use import::{restore_contexts, NoopHooks, RestoreHooks, RestoreReport};
pub use records::{BlockRow, NodeRow, PrunedBlockSummary, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
