use serde::{Deserialize, Serialize};
use weft_context::CommitObject;
use weft_types::{ContextHash, HistoryMode, ObjectId};

/// Leading magic of every snapshot file.
pub const SNAPSHOT_MAGIC: &[u8; 8] = b"WEFTSNAP";

/// Current format version, written big-endian after the magic.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Record type tags.
pub(crate) const TAG_BLOCK: u8 = 1;
pub(crate) const TAG_NODE: u8 = 2;
pub(crate) const TAG_END: u8 = 3;

/// Summary standing in for a block whose full operation contents were
/// pruned under the active history mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrunedBlockSummary {
    /// Serialized block header of the pruned block.
    pub header: Vec<u8>,
    /// Serialized operations, one blob per validation pass.
    pub operations: Vec<Vec<u8>>,
}

/// One block of the dumped chain, written oldest-first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRow {
    /// Serialized block header.
    pub header: Vec<u8>,
    /// Serialized block-level metadata (operations and receipts).
    pub metadata: Vec<u8>,
    /// Present when full operation contents are unavailable under the
    /// active history mode.
    pub pruned: Option<PrunedBlockSummary>,
    /// Hash of the block metadata, when the metadata itself was pruned.
    pub metadata_hash: Option<[u8; 32]>,
    /// Per-pass hashes of pruned operation metadata.
    pub operation_metadata_hashes: Option<Vec<Vec<[u8; 32]>>>,
    /// The commit record to rebuild for this block.
    pub commit: CommitObject,
    /// The context hash the source index recorded for this block. The
    /// importer must re-derive exactly this value.
    pub expected: ContextHash,
}

/// One tree node of the shared arena, keyed by content hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRow {
    /// Content-addressed id the data must hash back to.
    pub id: ObjectId,
    /// Object kind type byte ([`weft_store::ObjectKind`]).
    pub kind: u8,
    /// The node's serialized bytes.
    pub data: Vec<u8>,
}

/// History mode byte written in the stream header.
pub(crate) fn mode_byte(mode: HistoryMode) -> u8 {
    match mode {
        HistoryMode::Archive => 0,
        HistoryMode::Full => 1,
        HistoryMode::Rolling => 2,
    }
}

/// Parse a history mode byte.
pub(crate) fn mode_from_byte(byte: u8) -> Option<HistoryMode> {
    match byte {
        0 => Some(HistoryMode::Archive),
        1 => Some(HistoryMode::Full),
        2 => Some(HistoryMode::Rolling),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_types::Timestamp;

    #[test]
    fn mode_byte_roundtrip() {
        for mode in HistoryMode::ALL {
            assert_eq!(mode_from_byte(mode_byte(mode)), Some(mode));
        }
        assert!(mode_from_byte(9).is_none());
    }

    #[test]
    fn block_row_bincode_roundtrip() {
        let row = BlockRow {
            header: b"header".to_vec(),
            metadata: b"metadata".to_vec(),
            pruned: Some(PrunedBlockSummary {
                header: b"pruned-header".to_vec(),
                operations: vec![b"op1".to_vec(), b"op2".to_vec()],
            }),
            metadata_hash: Some([1u8; 32]),
            operation_metadata_hashes: Some(vec![vec![[2u8; 32], [3u8; 32]]]),
            commit: CommitObject {
                root: ObjectId::from_bytes(b"root"),
                time: Timestamp::from_unix(100),
                message: "block".into(),
                genesis: None,
            },
            expected: ContextHash::from_hash([4u8; 32]),
        };
        let bytes = bincode::serialize(&row).unwrap();
        let decoded: BlockRow = bincode::deserialize(&bytes).unwrap();
        assert_eq!(row, decoded);
    }

    #[test]
    fn node_row_bincode_roundtrip() {
        let row = NodeRow {
            id: ObjectId::from_bytes(b"node"),
            kind: 2,
            data: b"node bytes".to_vec(),
        };
        let bytes = bincode::serialize(&row).unwrap();
        let decoded: NodeRow = bincode::deserialize(&bytes).unwrap();
        assert_eq!(row, decoded);
    }
}
