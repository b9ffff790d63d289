use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content-addressed identifier for any stored tree node.
///
/// An `ObjectId` is the BLAKE3 hash of a node's canonical encoding.
/// Identical content always produces the same `ObjectId`, which is what
/// makes structural sharing work: a subtree referenced from two snapshots
/// is stored exactly once.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; 32]);

impl ObjectId {
    /// Compute an `ObjectId` from raw bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Create an `ObjectId` from a pre-computed hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The null object ID (all zeros). Represents "no object".
    pub const fn null() -> Self {
        Self([0u8; 32])
    }

    /// Returns `true` if this is the null object ID.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for ObjectId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectId> for [u8; 32] {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}
