use std::collections::BTreeMap;
use std::sync::Arc;

use weft_store::ObjectStore;
use weft_types::{ContextKey, ObjectId};

use crate::error::{TreeError, TreeResult};
use crate::node::{self, EntryKind, TreeEntry, TreeNode};

/// What `fold` hands to its callback for each visited entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FoldEntry {
    /// A leaf value with its bytes.
    Value(Vec<u8>),
    /// A subtree marker. The callback decides whether to descend into it.
    Tree,
}

/// Traversal control returned by the `fold` callback.
///
/// Only meaningful for [`FoldEntry::Tree`]; ignored for values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FoldControl {
    /// Recurse into the subtree.
    Descend,
    /// Skip the subtree's contents.
    Skip,
}

/// The in-memory overlay of a persistent tree.
///
/// A working tree mixes three kinds of nodes: fresh values, fresh
/// directories, and lazy references to nodes already persisted in the
/// arena. Mutation copies only the spine from the changed leaf to the
/// root; every untouched sibling stays a cheap `Stored` reference or a
/// shared `Arc`, so structural sharing holds both in memory and on disk.
#[derive(Clone, Debug)]
pub enum WorkingTree {
    /// A leaf value not yet persisted (or loaded from the arena).
    Value(Arc<Vec<u8>>),
    /// A directory whose children may be any mix of node kinds.
    Dir(Arc<BTreeMap<String, WorkingTree>>),
    /// A reference to a persisted node, loaded on demand.
    Stored {
        /// Arena id of the node.
        id: ObjectId,
        /// Whether the node is a value or a subtree.
        kind: EntryKind,
    },
}

impl WorkingTree {
    /// The empty tree (genesis root).
    pub fn empty() -> Self {
        Self::Dir(Arc::new(BTreeMap::new()))
    }

    /// A working tree rooted at a persisted subtree.
    pub fn from_root(id: ObjectId) -> Self {
        Self::Stored {
            id,
            kind: EntryKind::Tree,
        }
    }

    /// Returns `true` for a directory with no entries. Only the root is
    /// ever allowed to be in this state.
    pub fn is_empty_dir(&self) -> bool {
        matches!(self, Self::Dir(map) if map.is_empty())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Look up the value at `key`.
    ///
    /// Returns `Ok(None)` if any intermediate step is a value or missing,
    /// or if the entry at `key` is a subtree rather than a value.
    pub fn find(&self, store: &dyn ObjectStore, key: &ContextKey) -> TreeResult<Option<Vec<u8>>> {
        let Some(node) = self.descend(store, key.steps())? else {
            return Ok(None);
        };
        match node {
            Self::Value(bytes) => Ok(Some((*bytes).clone())),
            Self::Stored {
                id,
                kind: EntryKind::Value,
            } => {
                let obj = read_node(store, &id)?;
                Ok(Some(node::value_bytes(&obj)?))
            }
            _ => Ok(None),
        }
    }

    /// Returns `true` if a value exists at `key`.
    pub fn mem(&self, store: &dyn ObjectStore, key: &ContextKey) -> TreeResult<bool> {
        Ok(matches!(
            self.descend(store, key.steps())?,
            Some(Self::Value(_))
                | Some(Self::Stored {
                    kind: EntryKind::Value,
                    ..
                })
        ))
    }

    /// Returns `true` if a subtree exists at `key`.
    pub fn mem_tree(&self, store: &dyn ObjectStore, key: &ContextKey) -> TreeResult<bool> {
        Ok(matches!(
            self.descend(store, key.steps())?,
            Some(Self::Dir(_))
                | Some(Self::Stored {
                    kind: EntryKind::Tree,
                    ..
                })
        ))
    }

    /// Immediate children of the subtree at `key`, sorted by step name.
    ///
    /// Returns an empty list when `key` is absent or points at a value.
    pub fn list(
        &self,
        store: &dyn ObjectStore,
        key: &ContextKey,
    ) -> TreeResult<Vec<(String, EntryKind)>> {
        let Some(node) = self.descend(store, key.steps())? else {
            return Ok(Vec::new());
        };
        let Some(map) = node.dir_entries(store)? else {
            return Ok(Vec::new());
        };
        Ok(map
            .iter()
            .map(|(name, child)| (name.clone(), child.entry_kind()))
            .collect())
    }

    // -----------------------------------------------------------------------
    // Writes (pure: every mutation returns a new root)
    // -----------------------------------------------------------------------

    /// Set the value at `key`, creating intermediate subtrees as needed.
    ///
    /// A value sitting where an intermediate subtree is needed is replaced
    /// by that subtree. Untouched siblings are shared with `self`.
    pub fn add(&self, store: &dyn ObjectStore, key: &ContextKey, value: &[u8]) -> TreeResult<Self> {
        self.add_at(store, key.steps(), value)
    }

    fn add_at(&self, store: &dyn ObjectStore, steps: &[String], value: &[u8]) -> TreeResult<Self> {
        let (step, rest) = steps.split_first().expect("keys are non-empty");
        let mut map = match self.dir_entries(store)? {
            Some(map) => (*map).clone(),
            // A value in the way is replaced by a fresh subtree.
            None => BTreeMap::new(),
        };
        let child = if rest.is_empty() {
            Self::Value(Arc::new(value.to_vec()))
        } else {
            let base = map.remove(step).unwrap_or_else(Self::empty);
            base.add_at(store, rest, value)?
        };
        map.insert(step.clone(), child);
        Ok(Self::Dir(Arc::new(map)))
    }

    /// Remove the entry at `key` (value or subtree).
    ///
    /// Ancestors emptied by the removal are pruned recursively, so `find`
    /// on the removed path returns absence and `fold` never yields dead
    /// branches. Removing an absent key returns an equivalent tree.
    pub fn remove(&self, store: &dyn ObjectStore, key: &ContextKey) -> TreeResult<Self> {
        match self.remove_at(store, key.steps())? {
            Some(tree) => Ok(tree),
            // The root is the one directory allowed to be empty.
            None => Ok(Self::empty()),
        }
    }

    /// `None` means this node became empty and must be pruned by its parent.
    fn remove_at(&self, store: &dyn ObjectStore, steps: &[String]) -> TreeResult<Option<Self>> {
        let (step, rest) = steps.split_first().expect("keys are non-empty");
        let Some(map_arc) = self.dir_entries(store)? else {
            // A value here: nothing at the key, leave the tree unchanged.
            return Ok(Some(self.clone()));
        };
        let Some(child) = map_arc.get(step) else {
            return Ok(Some(self.clone()));
        };

        let mut map = (*map_arc).clone();
        if rest.is_empty() {
            map.remove(step);
        } else {
            match child.remove_at(store, rest)? {
                Some(new_child) => {
                    map.insert(step.clone(), new_child);
                }
                None => {
                    map.remove(step);
                }
            }
        }

        if map.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Self::Dir(Arc::new(map))))
        }
    }

    // -----------------------------------------------------------------------
    // Fold
    // -----------------------------------------------------------------------

    /// Depth-first enumeration of every entry strictly under `prefix`, in
    /// lexical step order.
    ///
    /// For each entry the callback receives the accumulator, the absolute
    /// key, and either the value bytes or a subtree marker; for subtree
    /// markers the returned [`FoldControl`] chooses whether to descend.
    /// The traversal never mutates the tree and restarts from scratch on
    /// every call. An absent prefix (or a prefix pointing at a value)
    /// yields the initial accumulator untouched.
    pub fn fold<A, F>(
        &self,
        store: &dyn ObjectStore,
        prefix: &ContextKey,
        init: A,
        f: &mut F,
    ) -> TreeResult<A>
    where
        F: FnMut(A, &ContextKey, &FoldEntry) -> TreeResult<(A, FoldControl)>,
    {
        let Some(node) = self.descend(store, prefix.steps())? else {
            return Ok(init);
        };
        let mut path = prefix.steps().to_vec();
        node.fold_under(store, &mut path, init, f)
    }

    fn fold_under<A, F>(
        &self,
        store: &dyn ObjectStore,
        path: &mut Vec<String>,
        init: A,
        f: &mut F,
    ) -> TreeResult<A>
    where
        F: FnMut(A, &ContextKey, &FoldEntry) -> TreeResult<(A, FoldControl)>,
    {
        let Some(map) = self.dir_entries(store)? else {
            return Ok(init);
        };
        let mut acc = init;
        for (name, child) in map.iter() {
            path.push(name.clone());
            let key = ContextKey::new(path.clone()).expect("fold paths are non-empty");
            match child.entry_kind() {
                EntryKind::Value => {
                    let bytes = child.load_value(store)?;
                    let (next, _) = f(acc, &key, &FoldEntry::Value(bytes))?;
                    acc = next;
                }
                EntryKind::Tree => {
                    let (next, control) = f(acc, &key, &FoldEntry::Tree)?;
                    acc = next;
                    if control == FoldControl::Descend {
                        acc = child.fold_under(store, path, acc, f)?;
                    }
                }
            }
            path.pop();
        }
        Ok(acc)
    }

    // -----------------------------------------------------------------------
    // Persist
    // -----------------------------------------------------------------------

    /// Write every not-yet-persisted node reachable from this root into the
    /// arena, bottom-up, and return the root's id and kind.
    ///
    /// Referentially transparent: nodes already in the arena are skipped
    /// (content addressing makes the check exact), so persisting the same
    /// tree twice writes nothing new.
    pub fn persist(&self, store: &dyn ObjectStore) -> TreeResult<(ObjectId, EntryKind)> {
        match self {
            Self::Value(bytes) => {
                let obj = node::value_object(bytes);
                Ok((store.write(&obj)?, EntryKind::Value))
            }
            Self::Stored { id, kind } => Ok((*id, *kind)),
            Self::Dir(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (name, child) in map.iter() {
                    let (id, kind) = child.persist(store)?;
                    entries.push(TreeEntry::new(name.clone(), kind, id));
                }
                let obj = TreeNode::new(entries).to_stored_object()?;
                Ok((store.write(&obj)?, EntryKind::Tree))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Walk `steps` down from this node. `Ok(None)` when any step is
    /// missing or passes through a value.
    fn descend(&self, store: &dyn ObjectStore, steps: &[String]) -> TreeResult<Option<Self>> {
        let mut cur = self.clone();
        for step in steps {
            let Some(map) = cur.dir_entries(store)? else {
                return Ok(None);
            };
            match map.get(step) {
                Some(child) => cur = child.clone(),
                None => return Ok(None),
            }
        }
        Ok(Some(cur))
    }

    /// The directory entries of this node, loading from the arena when the
    /// node is a stored subtree. `Ok(None)` for values.
    fn dir_entries(
        &self,
        store: &dyn ObjectStore,
    ) -> TreeResult<Option<Arc<BTreeMap<String, WorkingTree>>>> {
        match self {
            Self::Dir(map) => Ok(Some(Arc::clone(map))),
            Self::Stored {
                id,
                kind: EntryKind::Tree,
            } => {
                let obj = read_node(store, id)?;
                let node = TreeNode::from_stored_object(&obj)?;
                let map: BTreeMap<String, WorkingTree> = node
                    .entries
                    .into_iter()
                    .map(|e| {
                        (
                            e.name,
                            Self::Stored {
                                id: e.id,
                                kind: e.kind,
                            },
                        )
                    })
                    .collect();
                Ok(Some(Arc::new(map)))
            }
            _ => Ok(None),
        }
    }

    fn entry_kind(&self) -> EntryKind {
        match self {
            Self::Value(_)
            | Self::Stored {
                kind: EntryKind::Value,
                ..
            } => EntryKind::Value,
            _ => EntryKind::Tree,
        }
    }

    fn load_value(&self, store: &dyn ObjectStore) -> TreeResult<Vec<u8>> {
        match self {
            Self::Value(bytes) => Ok((**bytes).clone()),
            Self::Stored {
                id,
                kind: EntryKind::Value,
            } => {
                let obj = read_node(store, id)?;
                node::value_bytes(&obj)
            }
            _ => Err(TreeError::Serialization(
                "expected a value node".to_string(),
            )),
        }
    }
}

/// Read a node from the arena, distinguishing "missing" from I/O failure.
pub(crate) fn read_node(
    store: &dyn ObjectStore,
    id: &ObjectId,
) -> TreeResult<weft_store::StoredObject> {
    store.read(id)?.ok_or(TreeError::Missing(*id))
}
