//! ============================================================================
//! Query - Filtering the flattened triplet collection
//! ============================================================================
//! A [`Filter`] is a conjunction of optional equality constraints. Each
//! present field is compared case-insensitively against the triplet's field
//! of the same name; an absent field matches everything.
//! ============================================================================

use crate::store::Snapshot;
use crate::types::{AuthoredTriplet, Fact, Filter};

fn same(constraint: Option<&String>, value: &str) -> bool {
    match constraint {
        Some(expected) => expected.to_lowercase() == value.to_lowercase(),
        None => true,
    }
}

/// True if `triplet` satisfies every constraint in `filter`
pub fn matches(triplet: &AuthoredTriplet, filter: &Filter) -> bool {
    same(filter.author.as_ref(), &triplet.author)
        && same(filter.subject.as_ref(), triplet.subject())
        && same(filter.predicate.as_ref(), triplet.predicate())
        && same(filter.object.as_ref(), triplet.object())
}

/// Matching triplets, in input order
pub fn filter_triplets(triplets: &[AuthoredTriplet], filter: &Filter) -> Vec<AuthoredTriplet> {
    triplets
        .iter()
        .filter(|t| matches(t, filter))
        .cloned()
        .collect()
}

/// Flatten the snapshot and filter it
pub fn query(snapshot: &Snapshot, filter: &Filter) -> Vec<AuthoredTriplet> {
    filter_triplets(&snapshot.flatten(), filter)
}

/// All triplets written by `author` (case-insensitive)
pub fn by_author(snapshot: &Snapshot, author: &str) -> Vec<AuthoredTriplet> {
    query(snapshot, &Filter::default().author(author))
}

pub fn by_subject(snapshot: &Snapshot, subject: &str) -> Vec<AuthoredTriplet> {
    query(snapshot, &Filter::default().subject(subject))
}

pub fn by_predicate(snapshot: &Snapshot, predicate: &str) -> Vec<AuthoredTriplet> {
    query(snapshot, &Filter::default().predicate(predicate))
}

pub fn by_object(snapshot: &Snapshot, object: &str) -> Vec<AuthoredTriplet> {
    query(snapshot, &Filter::default().object(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Triplet;

    fn sample() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert_batch(
            "Ali",
            [Triplet::new("Ali", "recommend", "FastAPI").into_record("2024-05-01T10:00:00")],
        );
        snapshot.insert_batch(
            "Ayşe",
            [Triplet::new("Ayşe", "like", "Rust").into_record("2024-05-01T10:02:00")],
        );
        snapshot.insert_batch(
            "Erdem",
            [Triplet::new("Erdem", "build", "UI").into_record("2024-05-01T10:03:00")],
        );
        snapshot
    }

    #[test]
    fn test_case_insensitive_match() {
        let snapshot = sample();
        let hits = query(&snapshot, &Filter::default().object("fastapi"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].author, "Ali");
        assert_eq!(by_author(&snapshot, "AYŞE").len(), 1);
    }

    #[test]
    fn test_constraints_are_anded() {
        let snapshot = sample();
        let filter = Filter::default().author("Ali").predicate("like");
        assert!(query(&snapshot, &filter).is_empty());

        let filter = Filter::default().author("ali").predicate("RECOMMEND");
        assert_eq!(query(&snapshot, &filter).len(), 1);
    }

    #[test]
    fn test_unconstrained_returns_everything() {
        let snapshot = sample();
        let all = query(&snapshot, &Filter::default());
        assert_eq!(all.len(), 3);
        assert_eq!(all, snapshot.flatten());
    }

    #[test]
    fn test_field_helpers() {
        let snapshot = sample();
        assert_eq!(by_subject(&snapshot, "erdem").len(), 1);
        assert_eq!(by_predicate(&snapshot, "build").len(), 1);
        assert_eq!(by_object(&snapshot, "ui")[0].author, "Erdem");
        assert!(by_object(&snapshot, "Go").is_empty());
    }
}
