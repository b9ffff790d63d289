use serde::{Deserialize, Serialize};
use weft_store::{ObjectKind, StoredObject};
use weft_types::ObjectId;

use crate::error::{TreeError, TreeResult};

/// What a tree entry points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// A leaf value.
    Value,
    /// A nested subtree.
    Tree,
}

/// A single entry in a persisted subtree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Step name.
    pub name: String,
    /// Whether the child is a value or a subtree.
    pub kind: EntryKind,
    /// Content-addressed id of the child.
    pub id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(name: impl Into<String>, kind: EntryKind, id: ObjectId) -> Self {
        Self {
            name: name.into(),
            kind,
            id,
        }
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// The canonical persisted encoding of a subtree.
///
/// Entries are kept sorted by step name so the encoding -- and therefore
/// the node's content hash -- is independent of insertion order. A
/// persisted `TreeNode` is never empty, with one exception: the root of an
/// empty context (the genesis tree). Emptied interior branches are pruned
/// by `remove` before they ever reach the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Sorted entries of this subtree.
    pub entries: Vec<TreeEntry>,
}

impl TreeNode {
    /// Create a new tree node with the given entries, sorting them by name.
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort();
        Self { entries }
    }

    /// The empty tree node (genesis root only).
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Look up an entry by step name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the node has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert into a `StoredObject` for the arena.
    pub fn to_stored_object(&self) -> TreeResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| TreeError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Tree, data))
    }

    /// Decode from a `StoredObject`, checking the kind tag.
    pub fn from_stored_object(obj: &StoredObject) -> TreeResult<Self> {
        if obj.kind != ObjectKind::Tree {
            return Err(TreeError::Corrupt {
                id: obj.compute_id(),
                reason: format!("expected tree, got {}", obj.kind),
            });
        }
        serde_json::from_slice(&obj.data).map_err(|e| TreeError::Corrupt {
            id: obj.compute_id(),
            reason: e.to_string(),
        })
    }
}

/// Wrap raw leaf bytes as a value object for the arena.
pub fn value_object(bytes: &[u8]) -> StoredObject {
    StoredObject::new(ObjectKind::Value, bytes.to_vec())
}

/// Decode leaf bytes from a `StoredObject`, checking the kind tag.
pub fn value_bytes(obj: &StoredObject) -> TreeResult<Vec<u8>> {
    if obj.kind != ObjectKind::Value {
        return Err(TreeError::Corrupt {
            id: obj.compute_id(),
            reason: format!("expected value, got {}", obj.kind),
        });
    }
    Ok(obj.data.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_sorted() {
        let node = TreeNode::new(vec![
            TreeEntry::new("zebra", EntryKind::Value, ObjectId::null()),
            TreeEntry::new("alpha", EntryKind::Value, ObjectId::null()),
            TreeEntry::new("middle", EntryKind::Tree, ObjectId::null()),
        ]);
        assert_eq!(node.entries[0].name, "alpha");
        assert_eq!(node.entries[1].name, "middle");
        assert_eq!(node.entries[2].name, "zebra");
    }

    #[test]
    fn hash_is_insertion_order_independent() {
        let a = TreeNode::new(vec![
            TreeEntry::new("x", EntryKind::Value, ObjectId::from_bytes(b"x")),
            TreeEntry::new("y", EntryKind::Value, ObjectId::from_bytes(b"y")),
        ]);
        let b = TreeNode::new(vec![
            TreeEntry::new("y", EntryKind::Value, ObjectId::from_bytes(b"y")),
            TreeEntry::new("x", EntryKind::Value, ObjectId::from_bytes(b"x")),
        ]);
        let id_a = a.to_stored_object().unwrap().compute_id();
        let id_b = b.to_stored_object().unwrap().compute_id();
        assert_eq!(id_a, id_b);
    }

    #[test]
    fn stored_object_roundtrip() {
        let node = TreeNode::new(vec![
            TreeEntry::new("file", EntryKind::Value, ObjectId::from_bytes(b"content")),
            TreeEntry::new("subdir", EntryKind::Tree, ObjectId::from_bytes(b"tree")),
        ]);
        let stored = node.to_stored_object().unwrap();
        let decoded = TreeNode::from_stored_object(&stored).unwrap();
        assert_eq!(node, decoded);
    }

    #[test]
    fn kind_mismatch_is_corrupt() {
        let stored = StoredObject::new(ObjectKind::Value, b"not a tree".to_vec());
        let err = TreeNode::from_stored_object(&stored).unwrap_err();
        assert!(matches!(err, TreeError::Corrupt { .. }));

        let tree = TreeNode::empty().to_stored_object().unwrap();
        let err = value_bytes(&tree).unwrap_err();
        assert!(matches!(err, TreeError::Corrupt { .. }));
    }

    #[test]
    fn get_uses_sorted_lookup() {
        let node = TreeNode::new(vec![
            TreeEntry::new("a", EntryKind::Value, ObjectId::from_bytes(b"a")),
            TreeEntry::new("b", EntryKind::Tree, ObjectId::from_bytes(b"b")),
            TreeEntry::new("c", EntryKind::Value, ObjectId::from_bytes(b"c")),
        ]);
        assert_eq!(node.get("b").unwrap().kind, EntryKind::Tree);
        assert!(node.get("missing").is_none());
    }

    #[test]
    fn value_object_roundtrip() {
        let obj = value_object(b"leaf bytes");
        assert_eq!(value_bytes(&obj).unwrap(), b"leaf bytes");
    }

    #[test]
    fn empty_node() {
        let node = TreeNode::empty();
        assert!(node.is_empty());
        assert_eq!(node.len(), 0);
    }
}
