// ============================================================================
// Snapshot - The whole memory as author -> ordered list of records
// ============================================================================
// Authors are kept in a BTreeMap so every serialization of the same snapshot
// is byte-identical. Per-author lists keep insertion order. Record ids are
// unique across the whole snapshot.
// ============================================================================

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{AuthoredTriplet, MemoryError, MemoryResult, TripletPatch, TripletRecord};

/// In-memory image of the persisted store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    authors: BTreeMap<String, Vec<TripletRecord>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a snapshot from flattened triplets, assigning ids where missing
    pub fn from_authored(triplets: impl IntoIterator<Item = AuthoredTriplet>) -> Self {
        let mut snapshot = Self::new();
        for triplet in triplets {
            snapshot.insert_batch(&triplet.author, [triplet.record]);
        }
        snapshot
    }

    pub(crate) fn from_map(authors: BTreeMap<String, Vec<TripletRecord>>) -> MemoryResult<Self> {
        let snapshot = Self { authors };
        snapshot.check_unique_ids()?;
        Ok(snapshot)
    }

    /// Decode the persisted JSON form. Two records sharing an id is corruption.
    pub fn from_json(bytes: &[u8]) -> MemoryResult<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::new());
        }
        let snapshot: Self =
            serde_json::from_slice(bytes).map_err(|e| MemoryError::CorruptSnapshot(e.to_string()))?;
        snapshot.check_unique_ids()?;
        Ok(snapshot)
    }

    fn check_unique_ids(&self) -> MemoryResult<()> {
        let mut seen = HashSet::new();
        for id in self.ids() {
            if !seen.insert(id) {
                return Err(MemoryError::CorruptSnapshot(format!("duplicate id {}", id)));
            }
        }
        Ok(())
    }

    fn ids(&self) -> impl Iterator<Item = &str> {
        self.authors
            .values()
            .flat_map(|list| list.iter())
            .filter_map(|r| r.id.as_deref())
    }

    /// Encode as pretty-printed JSON (two-space indent, non-ASCII kept verbatim)
    pub fn to_json(&self) -> MemoryResult<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| MemoryError::StorageUnavailable(format!("Failed to encode snapshot: {}", e)))
    }

    /// Native grouped structure, author -> records
    pub fn by_author(&self) -> &BTreeMap<String, Vec<TripletRecord>> {
        &self.authors
    }

    pub fn records(&self, author: &str) -> &[TripletRecord] {
        self.authors.get(author).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn authors(&self) -> impl Iterator<Item = &str> {
        self.authors.keys().map(String::as_str)
    }

    pub fn author_count(&self) -> usize {
        self.authors.len()
    }

    /// Total number of records across all authors
    pub fn len(&self) -> usize {
        self.authors.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append records under `author`, assigning fresh ids where missing or
    /// already taken. Returns the ids of the appended records in order.
    pub fn insert_batch(
        &mut self,
        author: &str,
        records: impl IntoIterator<Item = TripletRecord>,
    ) -> Vec<String> {
        let mut taken: HashSet<String> = self.ids().map(str::to_string).collect();
        let list = self.authors.entry(author.to_string()).or_default();
        let mut ids = Vec::new();
        for mut record in records {
            if let Some(id) = record.id.clone().filter(|id| taken.contains(id)) {
                warn!("Id {} is already stored, assigning a fresh one", id);
                record.id = None;
            }
            record.ensure_id();
            if let Some(id) = &record.id {
                taken.insert(id.clone());
                ids.push(id.clone());
            }
            list.push(record);
        }
        ids
    }

    /// Remove the record with the given id. A missing id is a no-op.
    pub fn delete_by_id(&mut self, id: &str) -> bool {
        for list in self.authors.values_mut() {
            if let Some(pos) = list.iter().position(|r| r.id.as_deref() == Some(id)) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Patch the record with the given id in place. A patch that would blank
    /// subject, predicate or object is rejected before lookup.
    pub fn update_by_id(&mut self, id: &str, patch: &TripletPatch) -> MemoryResult<bool> {
        patch.validate()?;
        match self.find_mut(id) {
            Some(record) => {
                record.apply(patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn find(&self, id: &str) -> Option<AuthoredTriplet> {
        self.authors.iter().find_map(|(author, list)| {
            list.iter()
                .find(|r| r.id.as_deref() == Some(id))
                .map(|r| AuthoredTriplet::new(author.clone(), r.clone()))
        })
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut TripletRecord> {
        self.authors
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|r| r.id.as_deref() == Some(id))
    }

    /// Mutable walk over every record, used by maintenance passes
    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut TripletRecord> {
        self.authors.values_mut().flat_map(|list| list.iter_mut())
    }

    /// Author-ordered, then insertion-ordered, flat view
    pub fn flatten(&self) -> Vec<AuthoredTriplet> {
        self.authors
            .iter()
            .flat_map(|(author, list)| {
                list.iter()
                    .map(move |record| AuthoredTriplet::new(author.clone(), record.clone()))
            })
            .collect()
    }
}
