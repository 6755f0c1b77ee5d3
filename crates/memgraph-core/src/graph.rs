//! ============================================================================
//! Graph Projector - Triplets as a directed, labelled graph
//! ============================================================================
//! Nodes are subjects and objects; each triplet adds an edge
//! subject -> object labelled with its predicate. Only one edge is kept per
//! (from, to) pair, and a repeated pair overwrites the label in place.
//! ============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Fact;

/// Exported edge, shaped for external visualizers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub relation: String,
}

#[derive(Debug, Clone, Default)]
pub struct TripletGraph {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    /// Outgoing edges per node, in target insertion order
    adjacency: Vec<Vec<(usize, String)>>,
}

impl TripletGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_triplets<F: Fact>(triplets: &[F]) -> Self {
        let mut graph = Self::new();
        for triplet in triplets {
            graph.add(triplet.subject(), triplet.predicate(), triplet.object());
        }
        graph
    }

    fn node(&mut self, name: &str) -> usize {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(name.to_string());
        self.index.insert(name.to_string(), id);
        self.adjacency.push(Vec::new());
        id
    }

    pub fn add(&mut self, subject: &str, predicate: &str, object: &str) {
        let from = self.node(subject);
        let to = self.node(object);
        let edges = &mut self.adjacency[from];
        match edges.iter_mut().find(|(target, _)| *target == to) {
            Some((_, label)) => *label = predicate.to_string(),
            None => edges.push((to, predicate.to_string())),
        }
    }

    /// Nodes in first-insertion order
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Edges grouped by source insertion order, then target insertion order
    pub fn edges(&self) -> Vec<GraphEdge> {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(from, targets)| {
                targets.iter().map(move |(to, relation)| GraphEdge {
                    from: self.nodes[from].clone(),
                    to: self.nodes[*to].clone(),
                    relation: relation.clone(),
                })
            })
            .collect()
    }
}

/// Project triplets straight to an edge list
pub fn project<F: Fact>(triplets: &[F]) -> Vec<GraphEdge> {
    TripletGraph::from_triplets(triplets).edges()
}
