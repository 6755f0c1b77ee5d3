// ============================================================================
// RedbBackend - Embedded key-value store (redb)
// ============================================================================
// Table "memory": author -> JSON array of that author's records.
// A save replaces every author entry inside one write transaction.
// ============================================================================

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, TableDefinition};
use tracing::{debug, info};

use super::{MemoryBackend, Snapshot};
use crate::types::{MemoryError, MemoryResult, TripletRecord};

const MEMORY: TableDefinition<&str, &[u8]> = TableDefinition::new("memory");

fn unavailable(context: &str, e: impl std::fmt::Display) -> MemoryError {
    MemoryError::StorageUnavailable(format!("{}: {}", context, e))
}

pub struct RedbBackend {
    db: Database,
    path: PathBuf,
}

impl RedbBackend {
    /// Open (or create) the database file and make sure the table exists
    pub fn open(path: impl Into<PathBuf>) -> MemoryResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| unavailable("Failed to create memory directory", e))?;
        }

        info!("Opening memory database at: {}", path.display());

        let db = Database::create(&path).map_err(|e| unavailable("Failed to open database", e))?;

        let write_txn = db
            .begin_write()
            .map_err(|e| unavailable("Failed to begin write", e))?;
        {
            let _ = write_txn
                .open_table(MEMORY)
                .map_err(|e| unavailable("Failed to create memory table", e))?;
        }
        write_txn
            .commit()
            .map_err(|e| unavailable("Failed to commit init", e))?;

        Ok(Self { db, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MemoryBackend for RedbBackend {
    fn load(&self) -> MemoryResult<Snapshot> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| unavailable("Failed to begin read", e))?;
        let table = read_txn
            .open_table(MEMORY)
            .map_err(|e| unavailable("Failed to open memory table", e))?;

        let mut authors: BTreeMap<String, Vec<TripletRecord>> = BTreeMap::new();
        let iter = table
            .range::<&str>(..)
            .map_err(|e| unavailable("Failed to iterate memory", e))?;
        for entry in iter {
            let (key, value) = entry.map_err(|e| unavailable("Failed to read entry", e))?;
            let records: Vec<TripletRecord> = serde_json::from_slice(value.value())
                .map_err(|e| MemoryError::CorruptSnapshot(format!("{}: {}", key.value(), e)))?;
            authors.insert(key.value().to_string(), records);
        }

        let snapshot = Snapshot::from_map(authors)?;
        debug!("Loaded {} triplets from {}", snapshot.len(), self.path.display());
        Ok(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> MemoryResult<()> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| unavailable("Failed to begin write", e))?;
        {
            let mut table = write_txn
                .open_table(MEMORY)
                .map_err(|e| unavailable("Failed to open memory table", e))?;

            let mut stale = Vec::new();
            for entry in table
                .range::<&str>(..)
                .map_err(|e| unavailable("Failed to iterate memory", e))?
            {
                let (key, _) = entry.map_err(|e| unavailable("Failed to read entry", e))?;
                let author = key.value().to_string();
                if !snapshot.by_author().contains_key(&author) {
                    stale.push(author);
                }
            }
            for author in &stale {
                table
                    .remove(author.as_str())
                    .map_err(|e| unavailable("Failed to remove author", e))?;
            }

            for (author, records) in snapshot.by_author() {
                let value = serde_json::to_vec(records)
                    .map_err(|e| unavailable("Failed to encode records", e))?;
                table
                    .insert(author.as_str(), value.as_slice())
                    .map_err(|e| unavailable("Failed to insert records", e))?;
            }
        }
        write_txn
            .commit()
            .map_err(|e| unavailable("Failed to commit", e))?;

        debug!("Saved {} triplets to {}", snapshot.len(), self.path.display());
        Ok(())
    }

    fn exists(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        format!("redb:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Triplet;

    #[test]
    fn test_empty_database_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RedbBackend::open(dir.path().join("memory.redb")).unwrap();
        assert!(backend.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_authors() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RedbBackend::open(dir.path().join("memory.redb")).unwrap();

        let mut snapshot = Snapshot::new();
        let ids = snapshot.insert_batch(
            "Ali",
            [Triplet::new("Ali", "recommend", "FastAPI").into_record("t1")],
        );
        snapshot.insert_batch("Ayşe", [Triplet::new("Ayşe", "like", "Rust").into_record("t2")]);
        backend.save(&snapshot).unwrap();
        assert_eq!(backend.load().unwrap(), snapshot);

        let mut without_ali = Snapshot::new();
        without_ali.insert_batch("Ayşe", [Triplet::new("Ayşe", "like", "Rust").into_record("t2")]);
        backend.save(&without_ali).unwrap();

        let loaded = backend.load().unwrap();
        assert_eq!(loaded.authors().collect::<Vec<_>>(), vec!["Ayşe"]);
        assert!(loaded.find(&ids[0]).is_none());
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.redb");

        let mut snapshot = Snapshot::new();
        snapshot.insert_batch("Erdem", [Triplet::new("Erdem", "build", "system").into_record("t")]);
        {
            let backend = RedbBackend::open(&path).unwrap();
            backend.save(&snapshot).unwrap();
        }

        let backend = RedbBackend::open(&path).unwrap();
        assert_eq!(backend.load().unwrap(), snapshot);
    }
}
