//! Query-time retrieval and answer synthesis.
//!
//! Ranking is a direct query-to-chunk similarity pass over the whole matrix;
//! the graph then expands the top candidates along their strongest edges.
//! "No good match" is not an error: the model is always asked for an answer
//! with whatever content was selected, even none. Only transport/service
//! failures surface as errors, and they leave the graph untouched.

use serde::{Deserialize, Serialize};

use grag_core::error::{codes, RagError};

use crate::embeddings::Embedder;
use crate::graph::GraphHandle;
use crate::llm::Llm;

pub mod prompts;

#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Number of direct-similarity candidates used as traversal seeds.
    pub top_k: usize,
    /// Candidates below this cosine similarity are not used as seeds.
    pub relevance_threshold: f32,
    /// Hard cap on context size after graph expansion.
    pub max_context_chunks: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            relevance_threshold: 0.2,
            max_context_chunks: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    pub answer: String,
    /// Chunk indices in visit order: seeds by rank, then graph expansion.
    /// Returned for observability and debugging.
    pub traversal_path: Vec<usize>,
    /// The visited chunks' text, aligned with `traversal_path`.
    pub filtered_content: Vec<String>,
}

pub struct QueryEngine<'a> {
    embedder: &'a dyn Embedder,
    llm: &'a dyn Llm,
    embedding_model: &'a str,
    llm_model: &'a str,
    config: QueryConfig,
}

impl<'a> QueryEngine<'a> {
    pub fn new(
        embedder: &'a dyn Embedder,
        llm: &'a dyn Llm,
        embedding_model: &'a str,
        llm_model: &'a str,
        config: QueryConfig,
    ) -> Self {
        Self {
            embedder,
            llm,
            embedding_model,
            llm_model,
            config,
        }
    }

    pub fn query(&self, handle: &GraphHandle, text: &str) -> Result<QueryResult, RagError> {
        let question = text.trim();
        if question.is_empty() {
            return Err(RagError::new(codes::QUERY_FAILED, "Query must not be empty"));
        }
        if handle.embedding_model != self.embedding_model {
            return Err(RagError::new(
                codes::QUERY_FAILED,
                "Session graph was built with a different embedding model",
            )
            .with_details(format!(
                "session={}; engine={}",
                handle.embedding_model, self.embedding_model
            )));
        }

        let query_vec = self
            .embedder
            .embed(self.embedding_model, question)
            .map_err(|e| {
                RagError::new(codes::QUERY_FAILED, "Failed to embed query")
                    .with_details(e.to_string())
                    .with_retryable(e.retryable)
            })?;
        let scores = handle.matrix.similarity_to_rows(&query_vec).map_err(|e| {
            RagError::new(codes::QUERY_FAILED, "Failed to rank chunks for query")
                .with_details(e.to_string())
        })?;

        let traversal_path = self.select_context(handle, &scores);
        let filtered_content: Vec<String> = traversal_path
            .iter()
            .filter_map(|&i| handle.graph.node(i).map(|n| n.content.clone()))
            .collect();

        let blocks = traversal_path
            .iter()
            .zip(filtered_content.iter())
            .map(|(&i, text)| prompts::excerpt_block(i, text))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");
        let prompt = prompts::answer_prompt(question, &blocks);
        let answer = self.llm.generate(self.llm_model, &prompt)?;

        tracing::debug!(
            seeds = self.config.top_k,
            context_chunks = traversal_path.len(),
            "query answered"
        );

        Ok(QueryResult {
            answer,
            traversal_path,
            filtered_content,
        })
    }

    /// Direct-similarity ranking followed by graph-assisted expansion.
    ///
    /// Ties rank by lower chunk index; expansion walks each seed's edges in
    /// weight order, appending unvisited neighbors until the context cap.
    fn select_context(&self, handle: &GraphHandle, scores: &[f32]) -> Vec<usize> {
        let mut ranked: Vec<(usize, f32)> =
            scores.iter().copied().enumerate().collect();
        ranked.sort_by(|x, y| {
            y.1.partial_cmp(&x.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(x.0.cmp(&y.0))
        });

        let seeds: Vec<usize> = ranked
            .iter()
            .take(self.config.top_k)
            .filter(|(_, score)| *score >= self.config.relevance_threshold)
            .map(|(i, _)| *i)
            .collect();

        let cap = self.config.max_context_chunks.max(1);
        let mut visited = vec![false; scores.len()];
        let mut path = Vec::new();
        for &seed in &seeds {
            if path.len() >= cap {
                break;
            }
            if !visited[seed] {
                visited[seed] = true;
                path.push(seed);
            }
        }
        'expansion: for &seed in &seeds {
            for (neighbor, _edge) in handle.graph.neighbors(seed) {
                if path.len() >= cap {
                    break 'expansion;
                }
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    path.push(neighbor);
                }
            }
        }
        path
    }
}
