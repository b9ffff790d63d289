//! Foundation types for the Weft context store.
//!
//! This crate provides the identity, addressing, and temporal types used
//! throughout the Weft system. Every other Weft crate depends on
//! `weft-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`] — Content-addressed identifier of a stored tree node (BLAKE3 hash)
//! - [`ContextHash`] — Content-derived identifier of one committed snapshot
//! - [`ChainId`] / [`ProtocolHash`] — Chain and protocol identity carried by the genesis commit
//! - [`ContextKey`] — Ordered, non-empty path addressing one location in a tree
//! - [`Timestamp`] — Caller-supplied commit time, hashed as part of the commit record
//! - [`HistoryMode`] — Retention policy governing what a snapshot dump includes

pub mod error;
pub mod history;
pub mod identity;
pub mod key;
pub mod object;
pub mod temporal;

pub use error::TypeError;
pub use history::HistoryMode;
pub use identity::{ChainId, ContextHash, ProtocolHash};
pub use key::ContextKey;
pub use object::ObjectId;
pub use temporal::Timestamp;
