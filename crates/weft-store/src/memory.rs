use std::collections::HashMap;
use std::sync::RwLock;

use weft_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. All objects are held in memory behind
/// a `RwLock` for safe concurrent access. Objects are cloned on read/write.
pub struct InMemoryObjectStore {
    objects: RwLock<Option<HashMap<ObjectId, StoredObject>>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(Some(HashMap::new())),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects
            .read()
            .expect("lock poisoned")
            .as_ref()
            .map_or(0, HashMap::len)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .as_ref()
            .map_or(0, |map| map.values().map(|obj| obj.size).sum())
    }

    /// Return a sorted list of all object IDs in the store.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let guard = self.objects.read().expect("lock poisoned");
        let mut ids: Vec<ObjectId> = guard
            .as_ref()
            .map_or_else(Vec::new, |map| map.keys().copied().collect());
        ids.sort();
        ids
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let guard = self.objects.read().expect("lock poisoned");
        let map = guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(map.get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        let mut guard = self.objects.write().expect("lock poisoned");
        let map = guard.as_mut().ok_or(StoreError::Closed)?;
        // Put-if-absent: content-addressing guarantees the same ID always
        // maps to the same content.
        map.entry(id).or_insert_with(|| object.clone());
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let guard = self.objects.read().expect("lock poisoned");
        let map = guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(map.contains_key(id))
    }

    fn flush(&self) -> StoreResult<()> {
        let guard = self.objects.read().expect("lock poisoned");
        guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(())
    }

    fn close(&self) -> StoreResult<()> {
        self.objects.write().expect("lock poisoned").take();
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}
