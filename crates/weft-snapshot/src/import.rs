use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{debug, info};
use weft_context::Index;
use weft_store::{ObjectKind, StoredObject};
use weft_types::{ContextHash, HistoryMode};

use crate::error::{SnapshotError, SnapshotResult};
use crate::records::{BlockRow, NodeRow, TAG_BLOCK, TAG_END, TAG_NODE};
use crate::stream::RecordReader;

/// Caller-supplied hooks invoked once per imported block.
///
/// `before_block` runs as soon as the block row is read, before its pruned
/// data and tree nodes are integrated; `after_block` runs once the block's
/// commit has been rebuilt and its hash verified. These are the only points
/// where the pipeline calls back into unrelated subsystems (persisting
/// block index entries, progress reporting).
pub trait RestoreHooks {
    /// Called before a block's data is integrated.
    fn before_block(&mut self, block: &BlockRow) -> SnapshotResult<()> {
        let _ = block;
        Ok(())
    }

    /// Called after a block's commit has been rebuilt and verified.
    fn after_block(&mut self, block: &BlockRow, hash: &ContextHash) -> SnapshotResult<()> {
        let _ = (block, hash);
        Ok(())
    }
}

/// Hooks that do nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl RestoreHooks for NoopHooks {}

/// Summary of a finished import.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestoreReport {
    /// Blocks rebuilt, oldest first.
    pub blocks: usize,
    /// Tree nodes materialized (previously unseen ids only).
    pub nodes: usize,
    /// History mode recorded in the stream header.
    pub mode: HistoryMode,
}

/// Rebuild a snapshot file at `path` into `index`.
///
/// Records are consumed in stream order: each block's tree nodes are
/// materialized into the arena (verifying that every node's bytes hash
/// back to its recorded id), each commit is rebuilt and its context hash
/// re-derived and checked against the recorded one, and the hooks fire
/// around each block. Terminal check: the most recent rebuilt commit must
/// hash to `expected` -- the hash the export was taken for. On any
/// integrity failure the destination index must be treated as
/// inconsistent; nothing is rolled back.
pub fn restore_contexts(
    index: &Index,
    path: &Path,
    expected: &ContextHash,
    hooks: &mut dyn RestoreHooks,
) -> SnapshotResult<RestoreReport> {
    let mut reader = RecordReader::new(BufReader::new(File::open(path)?));
    let mode = reader.read_header()?;
    debug!(path = %path.display(), %mode, expected = %expected.short_hex(), "restore starting");

    let store = index.objects();
    let mut pending: Option<BlockRow> = None;
    let mut last_hash: Option<ContextHash> = None;
    let mut blocks = 0usize;
    let mut nodes = 0usize;

    loop {
        let record = reader.next_record()?;
        match record.tag {
            TAG_BLOCK => {
                if let Some(row) = pending.take() {
                    last_hash = Some(finalize_block(&*store, row, hooks)?);
                    blocks += 1;
                }
                let row: BlockRow = bincode::deserialize(&record.payload).map_err(|e| {
                    SnapshotError::Corrupt {
                        offset: record.offset,
                        reason: format!("undecodable block row: {e}"),
                    }
                })?;
                hooks.before_block(&row)?;
                pending = Some(row);
            }
            TAG_NODE => {
                let node: NodeRow = bincode::deserialize(&record.payload).map_err(|e| {
                    SnapshotError::Corrupt {
                        offset: record.offset,
                        reason: format!("undecodable node row: {e}"),
                    }
                })?;
                if pending.is_none() {
                    return Err(SnapshotError::Corrupt {
                        offset: record.offset,
                        reason: "node record before any block record".into(),
                    });
                }
                materialize_node(&*store, node, record.offset)?;
                nodes += 1;
            }
            TAG_END => {
                if let Some(row) = pending.take() {
                    last_hash = Some(finalize_block(&*store, row, hooks)?);
                    blocks += 1;
                }
                break;
            }
            other => {
                return Err(SnapshotError::Corrupt {
                    offset: record.offset,
                    reason: format!("unknown record tag: {other}"),
                });
            }
        }
    }
    reader.verify_checksum()?;

    // Terminal integrity check: the most recent rebuilt commit must be the
    // one the export was taken for.
    match last_hash {
        Some(computed) if computed == *expected => {}
        Some(computed) => {
            return Err(SnapshotError::IntegrityMismatch {
                expected: *expected,
                computed,
            });
        }
        None => {
            return Err(SnapshotError::Corrupt {
                offset: 0,
                reason: "snapshot contains no blocks".into(),
            });
        }
    }

    store.flush()?;
    info!(blocks, nodes, %mode, "restore complete");
    Ok(RestoreReport {
        blocks,
        nodes,
        mode,
    })
}

/// Write one streamed node into the arena after verifying its id.
fn materialize_node(
    store: &dyn weft_store::ObjectStore,
    node: NodeRow,
    offset: u64,
) -> SnapshotResult<()> {
    let kind = ObjectKind::from_type_byte(node.kind).ok_or_else(|| SnapshotError::Corrupt {
        offset,
        reason: format!("unknown node kind byte: {}", node.kind),
    })?;
    let obj = StoredObject::new(kind, node.data);
    let computed = obj.compute_id();
    if computed != node.id {
        return Err(SnapshotError::Corrupt {
            offset,
            reason: format!("node {} hashes to {computed}", node.id),
        });
    }
    store.write(&obj)?;
    Ok(())
}

/// Rebuild a block's commit, verify its hash, and fire the post hook.
fn finalize_block(
    store: &dyn weft_store::ObjectStore,
    row: BlockRow,
    hooks: &mut dyn RestoreHooks,
) -> SnapshotResult<ContextHash> {
    if !store.exists(&row.commit.root)? {
        return Err(SnapshotError::Corrupt {
            offset: 0,
            reason: format!("commit root {} absent from stream", row.commit.root),
        });
    }
    let computed = row.commit.context_hash()?;
    if computed != row.expected {
        return Err(SnapshotError::IntegrityMismatch {
            expected: row.expected,
            computed,
        });
    }
    store.write(&row.commit.to_stored_object()?)?;
    debug!(hash = %computed.short_hex(), "block rebuilt");
    hooks.after_block(&row, &computed)?;
    Ok(computed)
}
