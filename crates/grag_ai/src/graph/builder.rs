//! Similarity graph construction.
//!
//! Embedding and concept extraction both complete before edge construction
//! begins: an edge weight needs the similarity score and the concept overlap.
//! For fixed embeddings and concept sets the resulting graph is exactly
//! reproducible. Edge evaluation is quadratic in chunk count, which is fine
//! at the expected scale of a single document's chunks.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use grag_core::chunk::ChunkStore;
use grag_core::error::{codes, RagError};
use grag_core::graph::{GraphNode, KnowledgeGraph};

use crate::embeddings::{embed_all, Embedder};
use crate::extract::ConceptExtractor;

use super::GraphHandle;

/// How similarity and concept overlap combine into an edge weight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeightFormula {
    /// `alpha * sim * beta * shared` — the historical formula, kept as the
    /// default for compatibility with graphs built by earlier revisions.
    Multiplicative,
    /// `alpha * sim + beta * shared` — the convex blend the alpha/beta
    /// parameters suggest. Opt-in alternative, never substituted silently.
    Additive,
}

#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Pairs must exceed this cosine similarity to get an edge.
    pub edges_threshold: f32,
    pub alpha: f32,
    pub beta: f32,
    pub formula: WeightFormula,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            edges_threshold: 0.8,
            alpha: 0.7,
            beta: 0.3,
            formula: WeightFormula::Multiplicative,
        }
    }
}

/// Edge weight from a similarity score and the shared-concept overlap.
/// `shared_len / min(len_a, len_b)` normalizes overlap; it is 0 when either
/// concept set is empty, so such pairs are weighted on similarity placement
/// alone under the additive formula and drop to 0 under the multiplicative one.
pub fn edge_weight(
    config: &GraphConfig,
    similarity: f32,
    shared_len: usize,
    len_a: usize,
    len_b: usize,
) -> f32 {
    let max_possible_shared = len_a.min(len_b);
    let normalized_shared = if max_possible_shared == 0 {
        0.0
    } else {
        shared_len as f32 / max_possible_shared as f32
    };
    match config.formula {
        WeightFormula::Multiplicative => {
            config.alpha * similarity * config.beta * normalized_shared
        }
        WeightFormula::Additive => config.alpha * similarity + config.beta * normalized_shared,
    }
}

pub struct GraphBuilder {
    config: GraphConfig,
}

impl GraphBuilder {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    /// Build the knowledge graph for a chunk sequence: nodes, embeddings,
    /// concepts, then weighted edges for every pair above the threshold.
    pub fn build(
        &self,
        store: &ChunkStore,
        embedder: &dyn Embedder,
        embedding_model: &str,
        extractor: &ConceptExtractor<'_>,
    ) -> Result<GraphHandle, RagError> {
        if store.is_empty() {
            return Err(RagError::new(
                codes::GRAPH_BUILD_FAILED,
                "No document chunks provided",
            ));
        }

        let matrix =
            embed_all(store, embedder, embedding_model).map_err(|e| RagError::build_failure(&e))?;
        let (concepts, warnings) = extractor
            .extract_all(store)
            .map_err(|e| RagError::build_failure(&e))?;

        let nodes: Vec<GraphNode> = store
            .iter()
            .zip(concepts)
            .map(|(chunk, concepts)| GraphNode {
                index: chunk.index,
                content: chunk.content.clone(),
                concepts,
            })
            .collect();

        let mut pending = Vec::new();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let similarity = matrix.similarity(i, j);
                if similarity <= self.config.edges_threshold {
                    continue;
                }
                let shared: BTreeSet<String> = nodes[i]
                    .concepts
                    .intersection(&nodes[j].concepts)
                    .cloned()
                    .collect();
                let weight = edge_weight(
                    &self.config,
                    similarity,
                    shared.len(),
                    nodes[i].concepts.len(),
                    nodes[j].concepts.len(),
                );
                pending.push((i, j, weight, similarity, shared));
            }
        }

        let mut graph = KnowledgeGraph::new(nodes, self.config.edges_threshold);
        for (i, j, weight, similarity, shared) in pending {
            graph
                .add_edge(i, j, weight, similarity, shared)
                .map_err(|e| RagError::build_failure(&e))?;
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            warnings = warnings.len(),
            "knowledge graph built"
        );

        Ok(GraphHandle {
            graph,
            matrix,
            warnings,
            embedding_model: embedding_model.to_string(),
        })
    }
}
