//! Snapshot and repository layers of the Weft context store.
//!
//! The [`Index`] owns the backing node arena and the mapping from a commit's
//! [`weft_types::ContextHash`] to its root tree; a [`Context`] is an
//! immutable snapshot handle checked out from it. Contexts are values:
//! every `add`/`remove` returns a new handle, and related handles share
//! arbitrary amounts of node storage thanks to content addressing.
//!
//! The life of a fresh store:
//!
//! ```no_run
//! use weft_context::{Index, IndexOptions};
//! use weft_types::{ChainId, ContextKey, ProtocolHash, Timestamp};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let index = Index::open("/var/lib/weft".as_ref(), IndexOptions::default())?;
//! let genesis = index.commit_genesis(
//!     ChainId::new(b"weftnet".to_vec()),
//!     Timestamp::epoch(),
//!     ProtocolHash::from_bytes(b"proto-genesis"),
//! )?;
//!
//! let ctx = index.checkout(&genesis)?.expect("genesis just committed");
//! let ctx = ctx.add(&ContextKey::parse("version")?, b"0.0")?;
//! let hash = ctx.commit(Timestamp::from_unix(1), "block 1")?;
//! # let _ = hash;
//! # Ok(())
//! # }
//! ```

pub mod commit;
pub mod context;
pub mod error;
pub mod index;

pub use commit::{CommitObject, GenesisInfo};
pub use context::Context;
pub use error::{ContextError, ContextResult};
pub use index::{Index, IndexOptions, PatchContextFn};

// The fold vocabulary is part of this crate's public surface.
pub use weft_tree::{EntryKind, FoldControl, FoldEntry};
