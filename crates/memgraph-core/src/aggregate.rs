//! ============================================================================
//! Aggregation - Counts and rankings over triplets
//! ============================================================================

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::{AuthoredTriplet, Fact};

/// Number of subjects reported by [`summarize`] unless configured otherwise
pub const DEFAULT_TOP_SUBJECTS: usize = 3;

/// Predicate -> occurrence count. Keys are compared exactly.
pub fn count_by_predicate<F: Fact>(triplets: &[F]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for triplet in triplets {
        *counts.entry(triplet.predicate().to_string()).or_insert(0) += 1;
    }
    counts
}

/// The `n` most frequent subjects, most frequent first.
/// Ties keep the order in which subjects first appeared.
pub fn top_subjects<F: Fact>(triplets: &[F], n: usize) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for triplet in triplets {
        let count = counts.entry(triplet.subject()).or_insert(0);
        if *count == 0 {
            order.push(triplet.subject().to_string());
        }
        *count += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|subject| {
            let count = counts[subject.as_str()];
            (subject, count)
        })
        .collect();
    // sort_by is stable, so first-seen order survives among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(n).map(|(subject, _)| subject).collect()
}

/// Author -> that author's triplets, in input order
pub fn group_by_author(triplets: &[AuthoredTriplet]) -> BTreeMap<String, Vec<AuthoredTriplet>> {
    let mut groups: BTreeMap<String, Vec<AuthoredTriplet>> = BTreeMap::new();
    for triplet in triplets {
        groups
            .entry(triplet.author.clone())
            .or_default()
            .push(triplet.clone());
    }
    groups
}

/// Memory overview as served by the summary endpoint and CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySummary {
    pub total_triplets: usize,
    pub by_user: BTreeMap<String, Vec<AuthoredTriplet>>,
    pub predicate_counts: BTreeMap<String, usize>,
    pub common_subjects: Vec<String>,
}

pub fn summarize(triplets: &[AuthoredTriplet], top_n: usize) -> MemorySummary {
    MemorySummary {
        total_triplets: triplets.len(),
        by_user: group_by_author(triplets),
        predicate_counts: count_by_predicate(triplets),
        common_subjects: top_subjects(triplets, top_n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Triplet;

    fn authored(author: &str, s: &str, p: &str, o: &str) -> AuthoredTriplet {
        AuthoredTriplet::new(author, Triplet::new(s, p, o).into_record("t"))
    }

    #[test]
    fn test_count_by_predicate() {
        let triplets = vec![
            Triplet::new("Ali", "like", "Rust"),
            Triplet::new("Ayşe", "like", "Go"),
            Triplet::new("Erdem", "build", "UI"),
            Triplet::new("Ali", "Like", "Zig"),
        ];
        let counts = count_by_predicate(&triplets);
        assert_eq!(counts["like"], 2);
        assert_eq!(counts["build"], 1);
        assert_eq!(counts["Like"], 1);
        assert_eq!(counts.values().sum::<usize>(), triplets.len());
        assert!(count_by_predicate::<Triplet>(&[]).is_empty());
    }

    #[test]
    fn test_top_subjects_tie_break_is_first_seen() {
        let triplets = vec![
            Triplet::new("Erdem", "build", "UI"),
            Triplet::new("Ali", "like", "Rust"),
            Triplet::new("Ayşe", "like", "Go"),
            Triplet::new("Ali", "recommend", "FastAPI"),
            Triplet::new("Ayşe", "love", "Rust"),
            Triplet::new("system", "store", "triplets"),
        ];

        let top = top_subjects(&triplets, 3);
        assert_eq!(top, vec!["Ali", "Ayşe", "Erdem"]);
        assert!(top_subjects(&triplets, 0).is_empty());
        assert_eq!(top_subjects(&triplets, 10), vec!["Ali", "Ayşe", "Erdem", "system"]);
    }

    #[test]
    fn test_summary() {
        let triplets = vec![
            authored("Ali", "Ali", "recommend", "FastAPI"),
            authored("Ayşe", "Ayşe", "like", "Rust"),
            authored("Ayşe", "Ayşe", "like", "Go"),
        ];
        let summary = summarize(&triplets, DEFAULT_TOP_SUBJECTS);

        assert_eq!(summary.total_triplets, 3);
        assert_eq!(summary.by_user["Ayşe"].len(), 2);
        assert_eq!(summary.predicate_counts["like"], 2);
        assert_eq!(summary.common_subjects[0], "Ayşe");

        let empty = summarize(&[], DEFAULT_TOP_SUBJECTS);
        assert_eq!(empty.total_triplets, 0);
        assert!(empty.common_subjects.is_empty());
    }

    #[test]
    fn test_group_by_author_keeps_order() {
        let triplets = vec![
            authored("Ali", "Ali", "like", "Rust"),
            authored("Erdem", "Erdem", "build", "UI"),
            authored("Ali", "Ali", "recommend", "FastAPI"),
        ];
        let groups = group_by_author(&triplets);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["Ali"][1].record.object, "FastAPI");
    }
}
