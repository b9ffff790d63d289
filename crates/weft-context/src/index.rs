use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};
use weft_store::{InMemoryObjectStore, ObjectStore, SledObjectStore, SledStoreOptions};
use weft_tree::WorkingTree;
use weft_types::{ChainId, ContextHash, ProtocolHash, Timestamp};

use crate::commit::{commit_object_id, CommitObject, GenesisInfo};
use crate::context::Context;
use crate::error::{ContextError, ContextResult};

/// Hook invoked during [`Index::commit_genesis`] to seed the fresh store
/// with content (test fixtures, protocol migrations). Receives the empty
/// genesis context and returns the seeded one.
pub type PatchContextFn = Arc<dyn Fn(Context) -> ContextResult<Context> + Send + Sync>;

/// Options for opening an [`Index`].
#[derive(Clone, Default)]
pub struct IndexOptions {
    /// Upper bound on the backing store's cache, in bytes.
    pub max_store_size: Option<u64>,
    /// Optional genesis seeding hook.
    pub patch_context: Option<PatchContextFn>,
}

impl std::fmt::Debug for IndexOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexOptions")
            .field("max_store_size", &self.max_store_size)
            .field("patch_context", &self.patch_context.is_some())
            .finish()
    }
}

/// The repository: owns the backing node arena and the hash → root-tree
/// mapping.
///
/// An `Index` is opened once per process lifetime against a backing
/// directory (or in memory, for tests and embedding). [`Context`] handles
/// flow out of it via [`Index::checkout`] and back into it via commits.
/// The handle is `Send + Sync`; checkouts of distinct hashes and commits of
/// disjoint content proceed without global locking -- content addressing
/// makes concurrent identical writes collide harmlessly.
pub struct Index {
    store: Arc<dyn ObjectStore>,
    options: IndexOptions,
}

impl Index {
    /// Open (or create) an index backed by a sled directory at `path`.
    pub fn open(path: &Path, options: IndexOptions) -> ContextResult<Self> {
        let store = SledObjectStore::open(
            path,
            SledStoreOptions {
                max_store_size: options.max_store_size,
            },
        )?;
        info!(path = %path.display(), "opened context index");
        Ok(Self {
            store: Arc::new(store),
            options,
        })
    }

    /// Open an index backed by the in-memory store.
    pub fn in_memory(options: IndexOptions) -> Self {
        Self {
            store: Arc::new(InMemoryObjectStore::new()),
            options,
        }
    }

    /// The raw arena handle. Exposed for the snapshot pipeline; everything
    /// else should go through `checkout`/`commit`.
    pub fn objects(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store)
    }

    /// Load the context committed under `hash`.
    ///
    /// Returns `Ok(None)` -- never an error -- when the hash is unknown, so
    /// callers can distinguish "not found" from "found but empty" by the
    /// option alone.
    pub fn checkout(&self, hash: &ContextHash) -> ContextResult<Option<Context>> {
        let Some(commit) = self.commit_info(hash)? else {
            return Ok(None);
        };
        debug!(hash = %hash.short_hex(), "checked out context");
        Ok(Some(Context::new(
            Arc::clone(&self.store),
            WorkingTree::from_root(commit.root),
        )))
    }

    /// Like [`Index::checkout`], but panics when the hash is unknown or the
    /// store fails.
    ///
    /// For call sites that have already established the hash must exist; an
    /// absence here is a caller-side logic error, not a recoverable runtime
    /// condition.
    pub fn checkout_expect(&self, hash: &ContextHash) -> Context {
        match self.checkout(hash) {
            Ok(Some(ctx)) => ctx,
            Ok(None) => panic!("checkout of unknown context hash {hash}"),
            Err(e) => panic!("checkout of context hash {hash} failed: {e}"),
        }
    }

    /// The stored commit record for `hash`, or `Ok(None)` when unknown.
    pub fn commit_info(&self, hash: &ContextHash) -> ContextResult<Option<CommitObject>> {
        let Some(obj) = self.store.read(&commit_object_id(hash))? else {
            return Ok(None);
        };
        Ok(Some(CommitObject::from_stored_object(hash, &obj)?))
    }

    /// Commit a context. Equivalent to [`Context::commit`]; provided so the
    /// repository surface mirrors checkout/commit symmetrically.
    pub fn commit(
        &self,
        context: &Context,
        time: Timestamp,
        message: impl Into<String>,
    ) -> ContextResult<ContextHash> {
        context.commit(time, message)
    }

    /// Create and persist the first commit: an empty tree (after the
    /// configured patch hook has seeded it) tagged with chain and protocol
    /// identity.
    ///
    /// Must be called exactly once per fresh index before any checkout can
    /// succeed.
    pub fn commit_genesis(
        &self,
        chain: ChainId,
        time: Timestamp,
        protocol: ProtocolHash,
    ) -> ContextResult<ContextHash> {
        let context = Context::new(Arc::clone(&self.store), WorkingTree::empty());
        let context = match &self.options.patch_context {
            Some(patch) => patch(context)?,
            None => context,
        };
        let hash = context.commit_inner(
            time,
            "Genesis".to_string(),
            Some(GenesisInfo { chain, protocol }),
        )?;
        info!(hash = %hash.short_hex(), "committed genesis context");
        Ok(hash)
    }

    /// Durability barrier on the backing store.
    pub fn flush(&self) -> ContextResult<()> {
        self.store.flush()?;
        Ok(())
    }

    /// Release backing-store resources. Subsequent operations fail with a
    /// closed-store error. Closing twice is a no-op.
    pub fn close(&self) -> ContextResult<()> {
        self.store.close()?;
        debug!("closed context index");
        Ok(())
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
