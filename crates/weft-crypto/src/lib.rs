//! Content hashing for the Weft context store.
//!
//! Every persisted node and commit is identified by a BLAKE3 hash of its
//! canonical encoding, domain-separated by object kind so that a value, a
//! tree, and a commit with identical bytes can never collide.

pub mod hasher;

pub use hasher::{ContentHasher, HasherError};
