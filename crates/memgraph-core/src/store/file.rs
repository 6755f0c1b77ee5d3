// ============================================================================
// JsonFileBackend - One pretty-printed JSON document on disk
// ============================================================================
// Writes go to a temp file in the same directory and are renamed over the
// target, so readers never observe a half-written snapshot.
// ============================================================================

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{MemoryBackend, Snapshot};
use crate::types::{MemoryError, MemoryResult};

pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MemoryBackend for JsonFileBackend {
    fn load(&self) -> MemoryResult<Snapshot> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            MemoryError::StorageUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let snapshot = Snapshot::from_json(&bytes)?;
        debug!("Loaded {} triplets from {}", snapshot.len(), self.path.display());
        Ok(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> MemoryResult<()> {
        let bytes = snapshot.to_json()?;
        let unavailable =
            |e: std::io::Error| MemoryError::StorageUnavailable(format!("{}: {}", self.path.display(), e));

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(unavailable)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(unavailable)?;
        tmp.write_all(&bytes).map_err(unavailable)?;
        tmp.as_file().sync_all().map_err(unavailable)?;
        tmp.persist(&self.path).map_err(|e| unavailable(e.error))?;

        debug!("Saved {} triplets to {}", snapshot.len(), self.path.display());
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}
