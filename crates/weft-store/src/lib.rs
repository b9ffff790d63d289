//! Content-addressed backing store for the Weft context store.
//!
//! This crate implements the hash-keyed node arena every snapshot shares.
//! Each piece of persisted data -- leaf values, subtree listings, commit
//! records -- is stored as an immutable object identified by its BLAKE3
//! hash (domain-separated by object kind).
//!
//! # Object Types
//!
//! - [`ObjectKind::Value`] -- raw leaf bytes
//! - [`ObjectKind::Tree`] -- subtree listing mapping steps to child ids
//! - [`ObjectKind::Commit`] -- snapshot commit record
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`SledObjectStore`] -- persistent store over a sled database directory
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes are put-if-absent: identical content is written at most once.
//! 3. Concurrent reads are always safe (objects are immutable).
//! 4. The store never interprets object contents -- it is a pure key-value store.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod disk;
pub mod error;
pub mod memory;
pub mod object;
pub mod traits;

pub use disk::{SledObjectStore, SledStoreOptions};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use object::{ObjectKind, StoredObject};
pub use traits::ObjectStore;
