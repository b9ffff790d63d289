//! Persistent content-addressed tree for the Weft context store.
//!
//! A tree maps [`weft_types::ContextKey`] paths to opaque byte values.
//! Trees are immutable: every mutation returns a new root that shares all
//! untouched subtrees with its ancestor. Persisted nodes live in a content-
//! addressed arena ([`weft_store::ObjectStore`]), so two structurally
//! identical subtrees anywhere in history collapse to one physical
//! encoding.
//!
//! # Pieces
//!
//! - [`TreeNode`] / [`TreeEntry`] -- the canonical persisted encoding of a
//!   subtree (sorted steps referencing child object ids)
//! - [`WorkingTree`] -- the in-memory overlay threaded through
//!   add/remove/find/fold, mixing fresh nodes with lazy references into the
//!   arena
//! - [`fold`][WorkingTree::fold] -- depth-first enumeration with caller-
//!   controlled descent, lexical step order
//! - [`persist`][WorkingTree::persist] -- the bottom-up write walk that
//!   turns a working tree into arena objects and a root id
//! - [`for_each_node`] -- the post-order node walk the snapshot pipeline
//!   uses to stream a committed tree

pub mod error;
pub mod node;
pub mod tree;
pub mod walk;

pub use error::{TreeError, TreeResult};
pub use node::{EntryKind, TreeEntry, TreeNode};
pub use tree::{FoldControl, FoldEntry, WorkingTree};
pub use walk::for_each_node;
