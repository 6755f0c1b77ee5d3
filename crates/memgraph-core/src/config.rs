//! ============================================================================
//! Configuration - Environment-driven settings for the memory engine
//! ============================================================================
//! | Variable                | Default                     |
//! |-------------------------|-----------------------------|
//! | `MEMGRAPH_MEMORY_PATH`  | `~/.memgraph/memory.json`   |
//! | `MEMGRAPH_BACKEND`      | inferred from the extension |
//! | `MEMGRAPH_RULES_PATH`   | built-in translator rules   |
//! | `MEMGRAPH_TOP_SUBJECTS` | 3                           |
//! ============================================================================

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, warn};

use crate::aggregate::DEFAULT_TOP_SUBJECTS;
use crate::store::{JsonFileBackend, MemoryStore, RedbBackend};
use crate::translate::QuestionTranslator;

pub const ENV_MEMORY_PATH: &str = "MEMGRAPH_MEMORY_PATH";
pub const ENV_BACKEND: &str = "MEMGRAPH_BACKEND";
pub const ENV_RULES_PATH: &str = "MEMGRAPH_RULES_PATH";
pub const ENV_TOP_SUBJECTS: &str = "MEMGRAPH_TOP_SUBJECTS";

/// Persistence backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Json,
    Redb,
}

impl BackendKind {
    /// `.redb` files use the embedded database, everything else is JSON
    pub fn infer(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("redb") => BackendKind::Redb,
            _ => BackendKind::Json,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Json => write!(f, "json"),
            BackendKind::Redb => write!(f, "redb"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(BackendKind::Json),
            "redb" => Ok(BackendKind::Redb),
            other => Err(anyhow!("Unknown backend: {} (expected json or redb)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemgraphConfig {
    pub memory_path: PathBuf,
    /// Explicit choice; `None` means inferred from `memory_path`
    pub backend: Option<BackendKind>,
    pub rules_path: Option<PathBuf>,
    pub top_subjects: usize,
}

impl MemgraphConfig {
    /// Load `.env` (if present), then read the process environment
    pub fn load() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!("Failed to load .env: {}", e);
            }
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let memory_path = match get(ENV_MEMORY_PATH) {
            Some(path) => PathBuf::from(path),
            None => default_memory_path()?,
        };

        let backend = get(ENV_BACKEND)
            .map(|value| value.parse::<BackendKind>())
            .transpose()
            .with_context(|| format!("Invalid {}", ENV_BACKEND))?;

        let top_subjects = match get(ENV_TOP_SUBJECTS) {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid {}: {}", ENV_TOP_SUBJECTS, value))?,
            None => DEFAULT_TOP_SUBJECTS,
        };

        let config = Self {
            memory_path,
            backend,
            rules_path: get(ENV_RULES_PATH).map(PathBuf::from),
            top_subjects,
        };
        debug!("Configuration: {:?}", config);
        Ok(config)
    }

    /// Point at a different memory file. An explicit backend is kept.
    pub fn with_memory_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.memory_path = path.into();
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = Some(backend);
        self
    }

    /// The explicit backend, else the one implied by the file extension
    pub fn backend_kind(&self) -> BackendKind {
        self.backend
            .unwrap_or_else(|| BackendKind::infer(&self.memory_path))
    }

    pub fn with_rules_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_path = Some(path.into());
        self
    }

    pub fn open_store(&self) -> Result<MemoryStore> {
        let store = match self.backend_kind() {
            BackendKind::Json => MemoryStore::new(JsonFileBackend::new(&self.memory_path)),
            BackendKind::Redb => MemoryStore::new(
                RedbBackend::open(&self.memory_path)
                    .with_context(|| format!("Failed to open {}", self.memory_path.display()))?,
            ),
        };
        Ok(store)
    }

    /// Rule table from `rules_path`, or the built-in one
    pub fn translator(&self) -> Result<QuestionTranslator> {
        match &self.rules_path {
            Some(path) => QuestionTranslator::from_file(path)
                .with_context(|| format!("Failed to load translator rules from {}", path.display())),
            None => Ok(QuestionTranslator::default()),
        }
    }
}

/// `~/.memgraph/memory.json`
pub fn default_memory_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".memgraph").join("memory.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_backend_inferred_from_extension() {
        let config = MemgraphConfig::from_lookup(lookup(&[(ENV_MEMORY_PATH, "/tmp/m/memory.redb")])).unwrap();
        assert_eq!(config.backend, None);
        assert_eq!(config.backend_kind(), BackendKind::Redb);
        assert_eq!(config.top_subjects, DEFAULT_TOP_SUBJECTS);
        assert_eq!(config.rules_path, None);

        let config = config.with_memory_path("/tmp/m/memory.json");
        assert_eq!(config.backend_kind(), BackendKind::Json);
    }

    #[test]
    fn test_explicit_backend_survives_path_override() {
        let config = MemgraphConfig::from_lookup(lookup(&[
            (ENV_MEMORY_PATH, "/tmp/m/memory.json"),
            (ENV_BACKEND, "redb"),
        ]))
        .unwrap()
        .with_memory_path("/tmp/m/mem.db");
        assert_eq!(config.backend_kind(), BackendKind::Redb);

        let config = config.with_backend(BackendKind::Json).with_memory_path("/tmp/m/memory.redb");
        assert_eq!(config.backend_kind(), BackendKind::Json);
    }

    #[test]
    fn test_explicit_values() {
        let config = MemgraphConfig::from_lookup(lookup(&[
            (ENV_MEMORY_PATH, "/data/mem.db"),
            (ENV_BACKEND, "REDB"),
            (ENV_RULES_PATH, "/etc/memgraph/rules.json"),
            (ENV_TOP_SUBJECTS, " 5 "),
        ]))
        .unwrap();

        assert_eq!(config.memory_path, PathBuf::from("/data/mem.db"));
        assert_eq!(config.backend, Some(BackendKind::Redb));
        assert_eq!(config.rules_path, Some(PathBuf::from("/etc/memgraph/rules.json")));
        assert_eq!(config.top_subjects, 5);
    }

    #[test]
    fn test_invalid_values() {
        assert!(MemgraphConfig::from_lookup(lookup(&[
            (ENV_MEMORY_PATH, "/tmp/memory.json"),
            (ENV_BACKEND, "sqlite"),
        ]))
        .is_err());
        assert!(MemgraphConfig::from_lookup(lookup(&[
            (ENV_MEMORY_PATH, "/tmp/memory.json"),
            (ENV_TOP_SUBJECTS, "three"),
        ]))
        .is_err());
    }

    #[test]
    fn test_open_store_and_rules() {
        let dir = tempfile::tempdir().unwrap();
        let rules = dir.path().join("rules.json");
        std::fs::write(
            &rules,
            r#"[{"pattern": "wer", "action": "return", "shape": "subject"}]"#,
        )
        .unwrap();

        let config = MemgraphConfig::from_lookup(lookup(&[(ENV_MEMORY_PATH, "unused.json")]))
            .unwrap()
            .with_memory_path(dir.path().join("memory.redb"))
            .with_rules_path(&rules);

        let store = config.open_store().unwrap();
        assert!(store.describe().starts_with("redb:"));
        assert!(store.load_or_empty().unwrap().is_empty());

        let translator = config.translator().unwrap();
        assert_eq!(translator.rules().len(), 1);

        let broken = config.with_rules_path(dir.path().join("missing.json"));
        assert!(broken.translator().is_err());
    }
}
