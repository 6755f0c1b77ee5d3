//! ============================================================================
//! MEMGRAPH-CORE: Chat memory as a triplet graph
//! ============================================================================
//! This crate turns group-chat messages into structured memory:
//! - Rule-based dependency parsing and (subject, predicate, object) extraction
//! - Persistent per-author memory (JSON file or embedded redb)
//! - Filtering, aggregation and graph projection over stored triplets
//! - Keyword-table question translation and answer formatting
//! ============================================================================

pub mod aggregate;
pub mod answer;
pub mod config;
pub mod extractor;
pub mod graph;
pub mod ingest;
pub mod migrate;
pub mod parser;
pub mod qa;
pub mod query;
pub mod store;
pub mod translate;
pub mod types;

// Re-export main types for convenience
pub use types::*;
pub use aggregate::{summarize, MemorySummary};
pub use answer::{format_answer, NO_INFORMATION_FOUND};
pub use config::{BackendKind, MemgraphConfig};
pub use extractor::TripletExtractor;
pub use graph::{project, GraphEdge, TripletGraph};
pub use ingest::{ExtractResponse, QueryResponse};
pub use migrate::backfill_ids;
pub use parser::{RuleParser, SentenceParser};
pub use qa::ask;
pub use store::{JsonFileBackend, MemoryBackend, MemoryStore, RedbBackend, Snapshot};
pub use translate::QuestionTranslator;
