use serde::{Deserialize, Serialize};
use weft_store::{ObjectKind, StoredObject};
use weft_types::{ChainId, ContextHash, ObjectId, ProtocolHash, Timestamp};

use crate::error::{ContextError, ContextResult};

/// Chain and protocol identity carried by the genesis commit only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisInfo {
    /// Identity of the chain this store belongs to.
    pub chain: ChainId,
    /// Identity of the protocol active at genesis.
    pub protocol: ProtocolHash,
}

/// The persisted commit record.
///
/// A commit's [`ContextHash`] is derived from the canonical encoding of
/// this whole record, so it commits to the tree contents (through `root`)
/// *and* the metadata: the same tree with a different time or message
/// yields a different hash. Commits carry no parent pointers -- ancestry is
/// tracked by the caller's block headers; the store only needs hash →
/// root-tree lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitObject {
    /// Root tree node of the snapshot.
    pub root: ObjectId,
    /// Caller-supplied commit time.
    pub time: Timestamp,
    /// Free-text message.
    pub message: String,
    /// Present on the genesis commit only.
    pub genesis: Option<GenesisInfo>,
}

impl CommitObject {
    /// Convert into a `StoredObject` for the arena.
    pub fn to_stored_object(&self) -> ContextResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| ContextError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Commit, data))
    }

    /// Decode from a `StoredObject`, checking the kind tag.
    pub fn from_stored_object(hash: &ContextHash, obj: &StoredObject) -> ContextResult<Self> {
        if obj.kind != ObjectKind::Commit {
            return Err(ContextError::CorruptCommit {
                hash: *hash,
                reason: format!("expected commit, got {}", obj.kind),
            });
        }
        serde_json::from_slice(&obj.data).map_err(|e| ContextError::CorruptCommit {
            hash: *hash,
            reason: e.to_string(),
        })
    }

    /// The content-derived identity of this commit.
    pub fn context_hash(&self) -> ContextResult<ContextHash> {
        let id = self.to_stored_object()?.compute_id();
        Ok(ContextHash::from_hash(*id.as_bytes()))
    }
}

/// Arena key under which a commit with this hash is stored.
pub(crate) fn commit_object_id(hash: &ContextHash) -> ObjectId {
    ObjectId::from_hash(*hash.as_bytes())
}
