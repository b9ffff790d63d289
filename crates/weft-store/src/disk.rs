use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;
use weft_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Options for opening a [`SledObjectStore`].
#[derive(Clone, Debug, Default)]
pub struct SledStoreOptions {
    /// Upper bound on the backing store's in-memory cache, in bytes.
    /// `None` uses the backend default.
    pub max_store_size: Option<u64>,
}

/// Persistent object store over a sled database directory.
///
/// Keys are raw 32-byte object ids; values are `[type byte][data]` as
/// produced by [`StoredObject::encode`]. The on-disk layout beyond that is
/// the backend's own business.
pub struct SledObjectStore {
    path: PathBuf,
    db: RwLock<Option<sled::Db>>,
}

impl SledObjectStore {
    /// Open (or create) a store at the given directory.
    pub fn open(path: &Path, options: SledStoreOptions) -> StoreResult<Self> {
        let mut config = sled::Config::new().path(path);
        if let Some(bytes) = options.max_store_size {
            config = config.cache_capacity(bytes);
        }
        let db = config.open().map_err(|e| StoreError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "opened sled object store");
        Ok(Self {
            path: path.to_path_buf(),
            db: RwLock::new(Some(db)),
        })
    }

    /// Directory this store was opened against.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_db<T>(&self, f: impl FnOnce(&sled::Db) -> StoreResult<T>) -> StoreResult<T> {
        let guard = self.db.read().expect("lock poisoned");
        let db = guard.as_ref().ok_or(StoreError::Closed)?;
        f(db)
    }
}

impl ObjectStore for SledObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        self.with_db(|db| {
            let Some(bytes) = db.get(id.as_bytes())? else {
                return Ok(None);
            };
            let obj = StoredObject::decode(&bytes).ok_or_else(|| StoreError::CorruptObject {
                id: *id,
                reason: "unknown type byte".into(),
            })?;
            Ok(Some(obj))
        })
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        self.with_db(|db| {
            // Put-if-absent: a concurrent writer of identical content races
            // harmlessly (same key, same bytes).
            if db.get(id.as_bytes())?.is_none() {
                db.insert(id.as_bytes(), object.encode())?;
            }
            Ok(id)
        })
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        self.with_db(|db| Ok(db.contains_key(id.as_bytes())?))
    }

    fn flush(&self) -> StoreResult<()> {
        self.with_db(|db| {
            db.flush()?;
            Ok(())
        })
    }

    fn close(&self) -> StoreResult<()> {
        let mut guard = self.db.write().expect("lock poisoned");
        if let Some(db) = guard.take() {
            db.flush()?;
            debug!(path = %self.path.display(), "closed sled object store");
        }
        Ok(())
    }
}

impl std::fmt::Debug for SledObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let open = self.db.read().expect("lock poisoned").is_some();
        f.debug_struct("SledObjectStore")
            .field("path", &self.path)
            .field("open", &open)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;

    fn make_value(content: &[u8]) -> StoredObject {
        StoredObject::new(ObjectKind::Value, content.to_vec())
    }

    #[test]
    fn write_read_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledObjectStore::open(dir.path(), SledStoreOptions::default()).unwrap();

        let obj = make_value(b"persistent");
        let id = store.write(&obj).unwrap();
        let read_back = store.read(&id).unwrap().unwrap();
        assert_eq!(read_back, obj);
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let store = SledObjectStore::open(dir.path(), SledStoreOptions::default()).unwrap();
            let id = store.write(&make_value(b"durable")).unwrap();
            store.close().unwrap();
            id
        };

        let store = SledObjectStore::open(dir.path(), SledStoreOptions::default()).unwrap();
        let obj = store.read(&id).unwrap().expect("object should survive");
        assert_eq!(obj.data, b"durable");
    }

    #[test]
    fn write_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledObjectStore::open(dir.path(), SledStoreOptions::default()).unwrap();

        let obj = make_value(b"once");
        let id1 = store.write(&obj).unwrap();
        let id2 = store.write(&obj).unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn missing_object_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledObjectStore::open(dir.path(), SledStoreOptions::default()).unwrap();
        assert!(store.read(&ObjectId::from_bytes(b"nope")).unwrap().is_none());
        assert!(!store.exists(&ObjectId::from_bytes(b"nope")).unwrap());
    }

    #[test]
    fn operations_after_close_fail() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledObjectStore::open(dir.path(), SledStoreOptions::default()).unwrap();
        let id = store.write(&make_value(b"data")).unwrap();
        store.close().unwrap();

        assert!(matches!(store.read(&id), Err(StoreError::Closed)));
        assert!(matches!(
            store.write(&make_value(b"more")),
            Err(StoreError::Closed)
        ));
        assert!(matches!(store.flush(), Err(StoreError::Closed)));
        store.close().unwrap();
    }

    #[test]
    fn unusable_path_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        // A file where a directory is required.
        let file_path = dir.path().join("not-a-dir");
        std::fs::write(&file_path, b"occupied").unwrap();

        let err = SledObjectStore::open(&file_path, SledStoreOptions::default()).unwrap_err();
        assert!(matches!(err, StoreError::Open { .. }));
    }

    #[test]
    fn cache_capacity_option_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let options = SledStoreOptions {
            max_store_size: Some(4 * 1024 * 1024),
        };
        let store = SledObjectStore::open(dir.path(), options).unwrap();
        store.write(&make_value(b"sized")).unwrap();
        store.flush().unwrap();
    }
}
