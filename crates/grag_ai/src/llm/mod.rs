use grag_core::error::RagError;

/// Language model collaborator, used for concept extraction and final answer
/// synthesis.
pub trait Llm: Send + Sync {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, RagError>;
}

pub mod ollama_llm;

pub use ollama_llm::OllamaLlm;
