pub mod embeddings;
pub mod extract;
pub mod graph;
pub mod llm;
pub mod ollama;
pub mod query;
pub mod rag;
pub mod session;

pub use rag::{BuildOutcome, GraphRag, RagConfig};
