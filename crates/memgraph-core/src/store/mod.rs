// ============================================================================
// Memory Store - Persistent author -> triplet records mapping
// ============================================================================
// Every mutation is load -> modify -> save of the whole snapshot. The store
// serializes those cycles through a writer lock so two concurrent mutations
// in one process cannot lose each other's work.
// Default path: ~/.memgraph/memory.json (override via MEMGRAPH_MEMORY_PATH)
// ============================================================================

mod embedded;
mod file;
mod snapshot;

pub use embedded::RedbBackend;
pub use file::JsonFileBackend;
pub use snapshot::Snapshot;

use std::sync::Mutex;

use tracing::{debug, info};

use crate::types::{AuthoredTriplet, MemoryError, MemoryResult, TripletPatch, TripletRecord};

/// Where a snapshot lives between runs
pub trait MemoryBackend: Send + Sync {
    /// Read the whole snapshot
    fn load(&self) -> MemoryResult<Snapshot>;

    /// Replace the persisted snapshot atomically
    fn save(&self, snapshot: &Snapshot) -> MemoryResult<()>;

    /// Whether anything has been persisted yet
    fn exists(&self) -> bool;

    /// Human-readable location, for logs and CLI output
    fn describe(&self) -> String;
}

/// Memory store over a pluggable backend
pub struct MemoryStore {
    backend: Box<dyn MemoryBackend>,
    writer: Mutex<()>,
}

impl MemoryStore {
    pub fn new(backend: impl MemoryBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            writer: Mutex::new(()),
        }
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    /// Load the snapshot. A store that was never written surfaces as
    /// [`MemoryError::StorageUnavailable`]; see [`MemoryStore::load_or_empty`].
    pub fn load(&self) -> MemoryResult<Snapshot> {
        self.backend.load()
    }

    /// Load, treating a never-written store as empty
    pub fn load_or_empty(&self) -> MemoryResult<Snapshot> {
        if !self.backend.exists() {
            debug!("No memory at {} yet, starting empty", self.backend.describe());
            return Ok(Snapshot::new());
        }
        self.backend.load()
    }

    pub fn save(&self, snapshot: &Snapshot) -> MemoryResult<()> {
        let _guard = self.lock()?;
        self.backend.save(snapshot)
    }

    /// Run one load-modify-save cycle under the writer lock.
    /// Nothing is written if `f` leaves the snapshot unchanged.
    pub fn transact<T>(&self, f: impl FnOnce(&mut Snapshot) -> T) -> MemoryResult<T> {
        let _guard = self.lock()?;
        let mut snapshot = self.load_or_empty()?;
        let before = snapshot.clone();

        let out = f(&mut snapshot);

        if snapshot != before {
            self.backend.save(&snapshot)?;
        }
        Ok(out)
    }

    /// Append records under `author`, returning their ids
    pub fn insert_batch(&self, author: &str, records: Vec<TripletRecord>) -> MemoryResult<Vec<String>> {
        let ids = self.transact(|snapshot| snapshot.insert_batch(author, records))?;
        info!("Stored {} triplets for {}", ids.len(), author);
        Ok(ids)
    }

    /// Append already-authored triplets, grouping them by author
    pub fn insert_authored(&self, triplets: Vec<AuthoredTriplet>) -> MemoryResult<Vec<String>> {
        let ids = self.transact(|snapshot| {
            triplets
                .into_iter()
                .flat_map(|t| snapshot.insert_batch(&t.author, [t.record]))
                .collect::<Vec<_>>()
        })?;
        info!("Stored {} triplets", ids.len());
        Ok(ids)
    }

    pub fn delete_by_id(&self, id: &str) -> MemoryResult<bool> {
        let removed = self.transact(|snapshot| snapshot.delete_by_id(id))?;
        debug!("Delete {}: {}", id, if removed { "removed" } else { "not found" });
        Ok(removed)
    }

    pub fn update_by_id(&self, id: &str, patch: &TripletPatch) -> MemoryResult<bool> {
        patch.validate()?;
        let updated = self.transact(|snapshot| snapshot.update_by_id(id, patch))??;
        debug!("Update {}: {}", id, if updated { "applied" } else { "not found" });
        Ok(updated)
    }

    fn lock(&self) -> MemoryResult<std::sync::MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|_| MemoryError::StorageUnavailable("memory writer lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Triplet;
    use std::sync::Arc;

    fn json_store(dir: &tempfile::TempDir) -> MemoryStore {
        MemoryStore::new(JsonFileBackend::new(dir.path().join("memory.json")))
    }

    #[test]
    fn test_load_or_empty_on_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = json_store(&dir);

        assert!(matches!(store.load(), Err(MemoryError::StorageUnavailable(_))));
        assert!(store.load_or_empty().unwrap().is_empty());
    }

    #[test]
    fn test_insert_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = json_store(&dir);

        let ids = store
            .insert_batch("Ali", vec![Triplet::new("Ali", "recommend", "FastAPI").into_record("t")])
            .unwrap();
        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.find(&ids[0]).unwrap().record.object, "FastAPI");
    }

    #[test]
    fn test_delete_missing_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = json_store(&dir);

        assert!(!store.delete_by_id("nope").unwrap());
        assert!(!dir.path().join("memory.json").exists());
    }

    #[test]
    fn test_update_and_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = json_store(&dir);
        let ids = store
            .insert_batch("Ayşe", vec![Triplet::new("Ayşe", "like", "Rust").into_record("t")])
            .unwrap();

        let patch = TripletPatch {
            object: Some("Go".to_string()),
            ..Default::default()
        };
        assert!(store.update_by_id(&ids[0], &patch).unwrap());
        assert_eq!(store.load().unwrap().records("Ayşe")[0].object, "Go");

        assert!(store.delete_by_id(&ids[0]).unwrap());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_update_with_empty_object_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = json_store(&dir);
        let ids = store
            .insert_batch("Ali", vec![Triplet::new("Ali", "recommend", "FastAPI").into_record("t")])
            .unwrap();

        let patch = TripletPatch {
            object: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_by_id(&ids[0], &patch),
            Err(MemoryError::InvalidPatch(_))
        ));
        assert_eq!(store.load().unwrap().records("Ali")[0].object, "FastAPI");
    }

    #[test]
    fn test_reimported_export_gets_fresh_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = json_store(&dir);
        store
            .insert_batch("Ayşe", vec![Triplet::new("Ayşe", "like", "Rust").into_record("t")])
            .unwrap();

        let exported = store.load().unwrap().flatten();
        let ids = store.insert_authored(exported.clone()).unwrap();
        assert_ne!(Some(ids[0].as_str()), exported[0].id());

        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(store.delete_by_id(&ids[0]).unwrap());
        assert!(store.load().unwrap().find(&ids[0]).is_none());
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_inserts_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(json_store(&dir));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let record = Triplet::new("Erdem", "build", format!("service{}", i)).into_record("t");
                    store.insert_batch("Erdem", vec![record]).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.load().unwrap().len(), 8);
    }

    #[test]
    fn test_insert_authored_groups() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(RedbBackend::open(dir.path().join("memory.redb")).unwrap());

        let ids = store
            .insert_authored(vec![
                AuthoredTriplet::new("Ali", Triplet::new("Ali", "recommend", "FastAPI").into_record("t1")),
                AuthoredTriplet::new("Ayşe", Triplet::new("Ayşe", "like", "Rust").into_record("t2")),
            ])
            .unwrap();

        let snapshot = store.load().unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(snapshot.author_count(), 2);
        assert!(store.describe().starts_with("redb:"));
    }
}
