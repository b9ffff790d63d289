use std::collections::HashSet;
use std::io::BufWriter;
use std::path::Path;

use tracing::{debug, info};
use weft_context::{CommitObject, Index};
use weft_tree::{for_each_node, EntryKind, TreeError};
use weft_types::{ContextHash, HistoryMode, ObjectId};

use crate::error::{SnapshotError, SnapshotResult};
use crate::records::{BlockRow, NodeRow, PrunedBlockSummary, TAG_BLOCK, TAG_END, TAG_NODE};
use crate::stream::RecordWriter;

/// Per-block data supplied by the caller during export.
///
/// The store knows nothing about blocks; the provider bridges the node's
/// block storage into the walk. `predecessor` links the chain backward;
/// `None` marks the genesis block and ends the walk unconditionally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockData {
    /// Serialized block header.
    pub header: Vec<u8>,
    /// Serialized block-level metadata (operations and receipts).
    pub metadata: Vec<u8>,
    /// Present when full operation contents were pruned under the active
    /// history mode.
    pub pruned: Option<PrunedBlockSummary>,
    /// Hash of pruned block metadata.
    pub metadata_hash: Option<[u8; 32]>,
    /// Per-pass hashes of pruned operation metadata.
    pub operation_metadata_hashes: Option<Vec<Vec<[u8; 32]>>>,
    /// Context hash of the predecessor block, `None` at genesis.
    pub predecessor: Option<ContextHash>,
}

/// Supplies block data for each context hash visited by the walk.
pub trait BlockProvider {
    /// Data for the block committed under `hash`, or `Ok(None)` if the
    /// block is unknown to the caller.
    fn block_data(&self, hash: &ContextHash) -> SnapshotResult<Option<BlockData>>;
}

/// Phases of one export run: `Walking` discovers ancestors newest-first,
/// `Serializing` writes records oldest-first, `Done` means the file has
/// been published.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DumpState {
    Walking,
    Serializing,
    Done,
}

/// Summary of a finished export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DumpReport {
    /// Blocks written, oldest first.
    pub blocks: usize,
    /// Tree nodes written after stream-wide deduplication.
    pub nodes: usize,
    /// Total file size in bytes, including the trailing checksum.
    pub bytes: u64,
}

/// Export the chain of commits ending at `target` into a snapshot file at
/// `path`.
///
/// The walk runs backward from `target` until `should_stop` returns `true`
/// for a visited block (or the chain reaches genesis); records are then
/// serialized oldest-first so the import replays linearly. Any ancestor
/// whose commit or tree cannot be located aborts the dump -- the stream is
/// written through a temp file and only persisted on success, so no
/// partial file is ever considered valid.
pub fn dump_contexts(
    index: &Index,
    target: &ContextHash,
    mode: HistoryMode,
    provider: &dyn BlockProvider,
    should_stop: &dyn Fn(&BlockData) -> bool,
    path: &Path,
) -> SnapshotResult<DumpReport> {
    let mut state = DumpState::Walking;
    debug!(?state, target = %target.short_hex(), %mode, "dump starting");

    // Newest → oldest.
    let mut chain: Vec<(ContextHash, CommitObject, BlockData)> = Vec::new();
    let mut cursor = *target;
    loop {
        let data = provider
            .block_data(&cursor)?
            .ok_or_else(|| SnapshotError::DumpWalk {
                hash: cursor,
                reason: "no block data for context hash".into(),
            })?;
        let commit = index
            .commit_info(&cursor)?
            .ok_or_else(|| SnapshotError::DumpWalk {
                hash: cursor,
                reason: "commit not found in index".into(),
            })?;
        let next = data.predecessor;
        let stop = should_stop(&data) || next.is_none();
        chain.push((cursor, commit, data));
        if stop {
            break;
        }
        cursor = next.expect("walk continues only with a predecessor");
    }

    state = DumpState::Serializing;
    debug!(?state, blocks = chain.len(), "walk complete");

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = tempfile::NamedTempFile::new_in(parent)?;
    let mut writer = RecordWriter::new(BufWriter::new(tmp.reopen()?));
    writer.write_header(mode)?;

    let store = index.objects();
    let mut visited: HashSet<ObjectId> = HashSet::new();
    let mut nodes = 0usize;

    // Oldest → newest. The oldest block's node section is the full tree;
    // later sections carry only nodes unseen so far.
    for (hash, commit, data) in chain.iter().rev() {
        let row = BlockRow {
            header: data.header.clone(),
            metadata: data.metadata.clone(),
            pruned: data.pruned.clone(),
            metadata_hash: data.metadata_hash,
            operation_metadata_hashes: data.operation_metadata_hashes.clone(),
            commit: commit.clone(),
            expected: *hash,
        };
        let payload =
            bincode::serialize(&row).map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        writer.write_record(TAG_BLOCK, &payload)?;

        let mut emit = |id: &ObjectId, obj: &weft_store::StoredObject| -> Result<(), TreeError> {
            let node = NodeRow {
                id: *id,
                kind: obj.kind.type_byte(),
                data: obj.data.clone(),
            };
            let payload =
                bincode::serialize(&node).map_err(|e| TreeError::Serialization(e.to_string()))?;
            writer
                .write_record(TAG_NODE, &payload)
                .map_err(|e| TreeError::Serialization(e.to_string()))
        };
        for_each_node(
            store.as_ref(),
            commit.root,
            EntryKind::Tree,
            &mut visited,
            &mut emit,
        )
        .map_err(|e| match e {
            TreeError::Missing(id) => SnapshotError::DumpWalk {
                hash: *hash,
                reason: format!("missing tree node {id}"),
            },
            other => other.into(),
        })?;
        nodes = visited.len();
        debug!(block = %hash.short_hex(), nodes_total = nodes, "block serialized");
    }

    let (_, bytes) = writer.finish(TAG_END)?;
    tmp.persist(path).map_err(|e| SnapshotError::Io(e.error))?;

    state = DumpState::Done;
    info!(
        ?state,
        blocks = chain.len(),
        nodes,
        bytes,
        path = %path.display(),
        "dump complete"
    );
    Ok(DumpReport {
        blocks: chain.len(),
        nodes,
        bytes,
    })
}
