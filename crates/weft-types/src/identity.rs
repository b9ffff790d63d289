use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content-derived identifier of one committed snapshot.
///
/// A `ContextHash` is computed over the commit record's canonical encoding
/// (root tree id, timestamp, message, and genesis identity when present).
/// It is the external handle the rest of the node uses to reference "the
/// state after block N". Distinct from [`crate::ObjectId`] on purpose:
/// commits and tree nodes live in different hash domains.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextHash([u8; 32]);

impl ContextHash {
    /// Create a `ContextHash` from a pre-computed hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
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

impl fmt::Debug for ContextHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextHash({})", self.short_hex())
    }
}

impl fmt::Display for ContextHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Identity of the chain a store belongs to.
///
/// Carried only by the genesis commit; opaque to the store itself.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(Vec<u8>);

impl ChainId {
    /// Create a chain id from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", hex::encode(&self.0))
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// Identity of the protocol active at genesis.
///
/// Like [`ChainId`], carried only by the genesis commit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtocolHash([u8; 32]);

impl ProtocolHash {
    /// Create a protocol hash from a pre-computed hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// Derive a protocol hash from raw identifying bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for ProtocolHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProtocolHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ProtocolHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_hash_hex_roundtrip() {
        let hash = ContextHash::from_hash([0xab; 32]);
        let parsed = ContextHash::from_hex(&hash.to_hex()).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn context_hash_rejects_bad_hex() {
        assert!(matches!(
            ContextHash::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
        assert!(matches!(
            ContextHash::from_hex("abcd"),
            Err(TypeError::InvalidLength { .. })
        ));
    }

    #[test]
    fn chain_id_preserves_bytes() {
        let chain = ChainId::new(b"weftnet-2026".to_vec());
        assert_eq!(chain.as_bytes(), b"weftnet-2026");
    }

    #[test]
    fn protocol_hash_is_deterministic() {
        let p1 = ProtocolHash::from_bytes(b"proto-alpha");
        let p2 = ProtocolHash::from_bytes(b"proto-alpha");
        assert_eq!(p1, p2);
        assert_ne!(p1, ProtocolHash::from_bytes(b"proto-beta"));
    }

    #[test]
    fn serde_roundtrip() {
        let hash = ContextHash::from_hash([7; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        let parsed: ContextHash = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, parsed);
    }
}
