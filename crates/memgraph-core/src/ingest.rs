//! ============================================================================
//! Chat Ingestion - Message batches to triplets, graphs and stored memory
//! ============================================================================
//! Response shapes mirror what the chat client consumes:
//! `ExtractResponse` for extraction, `MemorySummary` for summaries,
//! `QueryResponse` for filtered queries.
//! ============================================================================

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::{summarize, MemorySummary};
use crate::extractor::TripletExtractor;
use crate::graph::{project, GraphEdge};
use crate::parser::SentenceParser;
use crate::query::filter_triplets;
use crate::store::MemoryStore;
use crate::types::{AuthoredTriplet, ChatMessage, Filter, MemoryResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub triplets: Vec<AuthoredTriplet>,
    pub graph: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub total_triplets: usize,
    pub results: Vec<AuthoredTriplet>,
}

impl QueryResponse {
    pub fn new(results: Vec<AuthoredTriplet>) -> Self {
        Self {
            total_triplets: results.len(),
            results,
        }
    }
}

/// Parse a JSON array of `{sender, text, timestamp}` messages
pub fn parse_messages(json: &str) -> serde_json::Result<Vec<ChatMessage>> {
    serde_json::from_str(json)
}

/// Extract triplets from every message plus their graph projection
pub fn extract<P: SentenceParser>(extractor: &TripletExtractor<P>, messages: &[ChatMessage]) -> ExtractResponse {
    let triplets = extractor.extract_messages(messages);
    let graph = project(&triplets);
    ExtractResponse { triplets, graph }
}

pub fn summary<P: SentenceParser>(
    extractor: &TripletExtractor<P>,
    messages: &[ChatMessage],
    top_n: usize,
) -> MemorySummary {
    summarize(&extractor.extract_messages(messages), top_n)
}

pub fn query<P: SentenceParser>(
    extractor: &TripletExtractor<P>,
    messages: &[ChatMessage],
    filter: &Filter,
) -> QueryResponse {
    QueryResponse::new(filter_triplets(&extractor.extract_messages(messages), filter))
}

/// Extract and persist in one store transaction. Returns the stored triplets
/// with their assigned ids.
pub fn ingest<P: SentenceParser>(
    extractor: &TripletExtractor<P>,
    store: &MemoryStore,
    messages: &[ChatMessage],
) -> MemoryResult<Vec<AuthoredTriplet>> {
    let mut triplets = extractor.extract_messages(messages);
    if triplets.is_empty() {
        info!("No triplets found in {} messages", messages.len());
        return Ok(triplets);
    }

    let ids = store.insert_authored(triplets.clone())?;
    for (triplet, id) in triplets.iter_mut().zip(ids) {
        triplet.record.id = Some(id);
    }
    info!("Ingested {} triplets from {} messages", triplets.len(), messages.len());
    Ok(triplets)
}
