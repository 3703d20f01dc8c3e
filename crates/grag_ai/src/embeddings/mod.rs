use grag_core::error::RagError;

/// Embedding service collaborator: deterministic fixed-dimension vectors for
/// identical input.
pub trait Embedder: Send + Sync {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, RagError>;
}

pub mod matrix;
pub mod ollama_embed;

pub use matrix::{embed_all, EmbeddingMatrix};
