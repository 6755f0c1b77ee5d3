//! ============================================================================
//! Migrations - One-off maintenance passes over persisted memory
//! ============================================================================

use tracing::info;

use crate::store::{MemoryStore, Snapshot};
use crate::types::MemoryResult;

/// Give every record lacking an id a fresh UUID v4. Returns how many were
/// assigned; existing ids are never touched, so a second run returns 0.
pub fn backfill_ids(snapshot: &mut Snapshot) -> usize {
    snapshot.records_mut().filter(|r| r.id.is_none()).fold(0, |assigned, record| {
        record.ensure_id();
        assigned + 1
    })
}

/// Run [`backfill_ids`] against the store, persisting only if anything changed
pub fn backfill_store(store: &MemoryStore) -> MemoryResult<usize> {
    let assigned = store.transact(backfill_ids)?;
    info!("Backfilled {} missing ids in {}", assigned, store.describe());
    Ok(assigned)
}
