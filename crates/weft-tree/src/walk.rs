use std::collections::HashSet;

use weft_store::{ObjectStore, StoredObject};
use weft_types::ObjectId;

use crate::error::TreeResult;
use crate::node::{EntryKind, TreeNode};
use crate::tree::read_node;

/// Post-order walk over every persisted node reachable from `root`.
///
/// Children are emitted before their parents, so a stream written in
/// emission order is self-contained at every point: by the time a subtree
/// node appears, all of its children have already appeared. Nodes in
/// `visited` are skipped (and every emitted node is added to it), which is
/// how the snapshot pipeline deduplicates nodes shared between the commits
/// of one walk.
///
/// Fails with [`crate::TreeError::Missing`] when a referenced node is not
/// in the store.
pub fn for_each_node(
    store: &dyn ObjectStore,
    root: ObjectId,
    kind: EntryKind,
    visited: &mut HashSet<ObjectId>,
    emit: &mut dyn FnMut(&ObjectId, &StoredObject) -> TreeResult<()>,
) -> TreeResult<()> {
    if visited.contains(&root) {
        return Ok(());
    }
    let obj = read_node(store, &root)?;
    if kind == EntryKind::Tree {
        let node = TreeNode::from_stored_object(&obj)?;
        for entry in &node.entries {
            for_each_node(store, entry.id, entry.kind, visited, emit)?;
        }
    }
    visited.insert(root);
    emit(&root, &obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeError;
    use crate::tree::WorkingTree;
    use weft_store::InMemoryObjectStore;
    use weft_types::ContextKey;

    fn key(s: &str) -> ContextKey {
        ContextKey::parse(s).unwrap()
    }

    fn collect(
        store: &dyn ObjectStore,
        root: ObjectId,
        visited: &mut HashSet<ObjectId>,
    ) -> Vec<ObjectId> {
        let mut out = Vec::new();
        for_each_node(store, root, EntryKind::Tree, visited, &mut |id, _| {
            out.push(*id);
            Ok(())
        })
        .unwrap();
        out
    }

    #[test]
    fn walk_covers_every_reachable_node() {
        let store = InMemoryObjectStore::new();
        let tree = WorkingTree::empty()
            .add(&store, &key("a/b"), b"1")
            .unwrap()
            .add(&store, &key("a/c"), b"2")
            .unwrap();
        let (root, _) = tree.persist(&store).unwrap();

        let mut visited = HashSet::new();
        let emitted = collect(&store, root, &mut visited);
        // Two values, subtree "a", root.
        assert_eq!(emitted.len(), 4);
        // Post-order: the root comes last.
        assert_eq!(*emitted.last().unwrap(), root);
        assert_eq!(visited.len(), 4);
    }

    #[test]
    fn shared_visited_set_deduplicates_across_walks() {
        let store = InMemoryObjectStore::new();
        let base = WorkingTree::empty()
            .add(&store, &key("shared/leaf"), b"same")
            .unwrap()
            .add(&store, &key("version"), b"1")
            .unwrap();
        let (root1, _) = base.persist(&store).unwrap();

        let fork = base.add(&store, &key("version"), b"2").unwrap();
        let (root2, _) = fork.persist(&store).unwrap();

        let mut visited = HashSet::new();
        let first = collect(&store, root1, &mut visited);
        let second = collect(&store, root2, &mut visited);

        // The second walk only emits the fork's unique nodes: the changed
        // value and the changed root.
        assert_eq!(first.len(), 4);
        assert_eq!(second.len(), 2);
        assert!(second.contains(&root2));
    }

    #[test]
    fn missing_node_aborts_walk() {
        let store = InMemoryObjectStore::new();
        let mut visited = HashSet::new();
        let err = for_each_node(
            &store,
            ObjectId::from_bytes(b"dangling"),
            EntryKind::Tree,
            &mut visited,
            &mut |_, _| Ok(()),
        )
        .unwrap_err();
        assert!(matches!(err, TreeError::Missing(_)));
    }
}
