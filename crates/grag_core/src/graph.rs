//! Node-and-weighted-edge structure over document chunks.
//!
//! Structural invariants, enforced at edge insertion:
//! - both endpoints reference existing nodes and differ (no self-loops);
//! - at most one edge per unordered pair, stored with `a < b`;
//! - `shared_concepts` is a subset of the intersection of the endpoints'
//!   concept sets.
//!
//! Once built the graph is read-only; concurrent queries need no locking.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{codes, RagError};

/// A chunk promoted to a graph node, carrying its extracted concept set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphNode {
    pub index: usize,
    pub content: String,
    pub concepts: BTreeSet<String>,
}

/// Undirected weighted relation between two nodes (`a < b` always).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphEdge {
    pub a: usize,
    pub b: usize,
    pub weight: f32,
    pub similarity: f32,
    pub shared_concepts: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    // Node index -> indices into `edges`, maintained by add_edge.
    adjacency: Vec<Vec<usize>>,
    edges_threshold: f32,
}

impl KnowledgeGraph {
    pub fn new(nodes: Vec<GraphNode>, edges_threshold: f32) -> Self {
        let adjacency = vec![Vec::new(); nodes.len()];
        Self {
            nodes,
            edges: Vec::new(),
            adjacency,
            edges_threshold,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges_threshold(&self) -> f32 {
        self.edges_threshold
    }

    pub fn node(&self, index: usize) -> Option<&GraphNode> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Insert an undirected edge, validating the structural invariants.
    pub fn add_edge(
        &mut self,
        a: usize,
        b: usize,
        weight: f32,
        similarity: f32,
        shared_concepts: BTreeSet<String>,
    ) -> Result<(), RagError> {
        if a == b {
            return Err(RagError::new(
                codes::GRAPH_INVARIANT_VIOLATION,
                "Self-loop edges are not allowed",
            )
            .with_details(format!("node={a}")));
        }
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        if b >= self.nodes.len() {
            return Err(RagError::new(
                codes::GRAPH_INVARIANT_VIOLATION,
                "Edge endpoint references a missing node",
            )
            .with_details(format!("a={a}; b={b}; nodes={}", self.nodes.len())));
        }
        if self.edge_between(a, b).is_some() {
            return Err(RagError::new(
                codes::GRAPH_INVARIANT_VIOLATION,
                "Duplicate edge for node pair",
            )
            .with_details(format!("a={a}; b={b}")));
        }
        let subset = shared_concepts
            .iter()
            .all(|c| self.nodes[a].concepts.contains(c) && self.nodes[b].concepts.contains(c));
        if !subset {
            return Err(RagError::new(
                codes::GRAPH_INVARIANT_VIOLATION,
                "Shared concepts must be common to both endpoints",
            )
            .with_details(format!("a={a}; b={b}")));
        }

        let edge_idx = self.edges.len();
        self.edges.push(GraphEdge {
            a,
            b,
            weight,
            similarity,
            shared_concepts,
        });
        self.adjacency[a].push(edge_idx);
        self.adjacency[b].push(edge_idx);
        Ok(())
    }

    pub fn edge_between(&self, i: usize, j: usize) -> Option<&GraphEdge> {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        self.adjacency
            .get(i)?
            .iter()
            .map(|&e| &self.edges[e])
            .find(|e| e.a == i && e.b == j)
    }

    /// Neighbors of `index` with their connecting edges, strongest edge first
    /// (neighbor index ascending on weight ties). Drives query-time expansion.
    pub fn neighbors(&self, index: usize) -> Vec<(usize, &GraphEdge)> {
        let Some(edge_ids) = self.adjacency.get(index) else {
            return Vec::new();
        };
        let mut out: Vec<(usize, &GraphEdge)> = edge_ids
            .iter()
            .map(|&e| {
                let edge = &self.edges[e];
                let other = if edge.a == index { edge.b } else { edge.a };
                (other, edge)
            })
            .collect();
        out.sort_by(|x, y| {
            y.1.weight
                .partial_cmp(&x.1.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(x.0.cmp(&y.0))
        });
        out
    }
}
