use std::sync::Arc;

use tracing::debug;
use weft_store::ObjectStore;
use weft_tree::{EntryKind, FoldControl, FoldEntry, TreeResult, WorkingTree};
use weft_types::{ContextHash, ContextKey, Timestamp};

use crate::commit::{CommitObject, GenesisInfo};
use crate::error::ContextResult;

/// An immutable snapshot handle over one tree root.
///
/// A `Context` is never mutated in place: `add` and `remove` return new
/// handles, and handles derived from the same or related ancestors share
/// node storage. Keys are relative to the context root. Nothing touches
/// the backing store durably until [`Context::commit`].
#[derive(Clone)]
pub struct Context {
    store: Arc<dyn ObjectStore>,
    tree: WorkingTree,
}

impl Context {
    pub(crate) fn new(store: Arc<dyn ObjectStore>, tree: WorkingTree) -> Self {
        Self { store, tree }
    }

    /// Look up the value at `key`. `Ok(None)` when absent.
    pub fn find(&self, key: &ContextKey) -> ContextResult<Option<Vec<u8>>> {
        Ok(self.tree.find(self.store.as_ref(), key)?)
    }

    /// Returns `true` if a value exists at `key`.
    pub fn mem(&self, key: &ContextKey) -> ContextResult<bool> {
        Ok(self.tree.mem(self.store.as_ref(), key)?)
    }

    /// Returns `true` if a subtree exists at `key`.
    pub fn mem_tree(&self, key: &ContextKey) -> ContextResult<bool> {
        Ok(self.tree.mem_tree(self.store.as_ref(), key)?)
    }

    /// Immediate children of the subtree at `key`, sorted by step name.
    pub fn list(&self, key: &ContextKey) -> ContextResult<Vec<(String, EntryKind)>> {
        Ok(self.tree.list(self.store.as_ref(), key)?)
    }

    /// A new context with `value` stored at `key`.
    pub fn add(&self, key: &ContextKey, value: &[u8]) -> ContextResult<Self> {
        let tree = self.tree.add(self.store.as_ref(), key, value)?;
        Ok(Self::new(Arc::clone(&self.store), tree))
    }

    /// A new context with the entry at `key` removed (and emptied ancestors
    /// pruned).
    pub fn remove(&self, key: &ContextKey) -> ContextResult<Self> {
        let tree = self.tree.remove(self.store.as_ref(), key)?;
        Ok(Self::new(Arc::clone(&self.store), tree))
    }

    /// Depth-first enumeration of every entry under `prefix`, lexical step
    /// order, with caller-controlled descent. See
    /// [`WorkingTree::fold`] for the full contract.
    pub fn fold<A, F>(&self, prefix: &ContextKey, init: A, f: &mut F) -> ContextResult<A>
    where
        F: FnMut(A, &ContextKey, &FoldEntry) -> TreeResult<(A, FoldControl)>,
    {
        Ok(self.tree.fold(self.store.as_ref(), prefix, init, f)?)
    }

    /// Persist every not-yet-persisted node reachable from the root, write
    /// the commit record, and flush the backing store.
    ///
    /// Referentially transparent over tree content: re-committing an
    /// already-persisted tree writes nothing beyond the commit record
    /// itself. The returned hash covers the tree *and* the metadata, so
    /// identical content with identical time/message yields an identical
    /// hash.
    pub fn commit(
        &self,
        time: Timestamp,
        message: impl Into<String>,
    ) -> ContextResult<ContextHash> {
        self.commit_inner(time, message.into(), None)
    }

    pub(crate) fn commit_inner(
        &self,
        time: Timestamp,
        message: String,
        genesis: Option<GenesisInfo>,
    ) -> ContextResult<ContextHash> {
        let (root, _) = self.tree.persist(self.store.as_ref())?;
        let commit = CommitObject {
            root,
            time,
            message,
            genesis,
        };
        let hash = commit.context_hash()?;
        self.store.write(&commit.to_stored_object()?)?;
        self.store.flush()?;
        debug!(hash = %hash.short_hex(), root = %root.short_hex(), "committed context");
        Ok(hash)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}
