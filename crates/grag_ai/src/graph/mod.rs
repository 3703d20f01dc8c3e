use grag_core::graph::KnowledgeGraph;

use crate::embeddings::EmbeddingMatrix;
use crate::extract::ExtractionWarning;

pub mod builder;

pub use builder::{edge_weight, GraphBuilder, GraphConfig, WeightFormula};

/// A built graph plus the artifacts query-time ranking needs. Read-only after
/// construction; safe to share across concurrent queries.
#[derive(Debug, Clone)]
pub struct GraphHandle {
    pub graph: KnowledgeGraph,
    pub matrix: EmbeddingMatrix,
    pub warnings: Vec<ExtractionWarning>,
    pub embedding_model: String,
}
