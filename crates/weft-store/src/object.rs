use serde::{Deserialize, Serialize};
use weft_crypto::ContentHasher;
use weft_types::ObjectId;

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Raw leaf bytes.
    Value,
    /// Subtree listing: sorted steps referencing child object ids.
    Tree,
    /// Snapshot commit record.
    Commit,
}

impl ObjectKind {
    /// Serialize to a type byte for wire formats and the disk backend.
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::Value => 1,
            Self::Tree => 2,
            Self::Commit => 3,
        }
    }

    /// Parse from a type byte.
    pub fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Value),
            2 => Some(Self::Tree),
            3 => Some(Self::Commit),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value => write!(f, "value"),
            Self::Tree => write!(f, "tree"),
            Self::Commit => write!(f, "commit"),
        }
    }
}

/// A stored object: kind tag + serialized data + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// contents of the data — it is a pure key-value store keyed by content
/// hash. Interpretation (tree-node decoding, commit decoding) happens in
/// the layers above.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The serialized bytes of the object.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    ///
    /// Uses the appropriate domain-separated hasher for each object kind.
    pub fn compute_id(&self) -> ObjectId {
        let hasher = match self.kind {
            ObjectKind::Value => &ContentHasher::VALUE,
            ObjectKind::Tree => &ContentHasher::TREE,
            ObjectKind::Commit => &ContentHasher::COMMIT,
        };
        hasher.hash(&self.data)
    }

    /// Encode as `[type byte][data]` for the disk backend and wire formats.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.data.len());
        out.push(self.kind.type_byte());
        out.extend_from_slice(&self.data);
        out
    }

    /// Decode from `[type byte][data]`. Returns `None` on an unknown type
    /// byte or empty input.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let (&type_byte, data) = bytes.split_first()?;
        let kind = ObjectKind::from_type_byte(type_byte)?;
        Some(Self::new(kind, data.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_object_id_deterministic() {
        let obj = StoredObject::new(ObjectKind::Value, b"deterministic".to_vec());
        assert_eq!(obj.compute_id(), obj.compute_id());
    }

    #[test]
    fn different_kinds_produce_different_ids() {
        let data = b"same data".to_vec();
        let value = StoredObject::new(ObjectKind::Value, data.clone());
        let tree = StoredObject::new(ObjectKind::Tree, data.clone());
        let commit = StoredObject::new(ObjectKind::Commit, data);
        assert_ne!(value.compute_id(), tree.compute_id());
        assert_ne!(value.compute_id(), commit.compute_id());
    }

    #[test]
    fn encode_decode_roundtrip() {
        for kind in [ObjectKind::Value, ObjectKind::Tree, ObjectKind::Commit] {
            let obj = StoredObject::new(kind, b"payload".to_vec());
            let decoded = StoredObject::decode(&obj.encode()).unwrap();
            assert_eq!(obj, decoded);
        }
    }

    #[test]
    fn decode_rejects_unknown_type_byte() {
        assert!(StoredObject::decode(&[0xFF, 1, 2, 3]).is_none());
        assert!(StoredObject::decode(&[]).is_none());
    }

    #[test]
    fn type_byte_roundtrip() {
        for kind in [ObjectKind::Value, ObjectKind::Tree, ObjectKind::Commit] {
            assert_eq!(ObjectKind::from_type_byte(kind.type_byte()), Some(kind));
        }
        assert!(ObjectKind::from_type_byte(0).is_none());
        assert!(ObjectKind::from_type_byte(4).is_none());
    }

    #[test]
    fn object_kind_display() {
        assert_eq!(format!("{}", ObjectKind::Value), "value");
        assert_eq!(format!("{}", ObjectKind::Tree), "tree");
        assert_eq!(format!("{}", ObjectKind::Commit), "commit");
    }
}
