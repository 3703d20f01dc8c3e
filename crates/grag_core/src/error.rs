use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable error codes shared across the engine. The web layer maps these to
/// HTTP responses; tests assert on them.
pub mod codes {
    /// Embedding service call failed (transport or bad response). Fatal to a build.
    pub const EMBEDDINGS_FAILED: &str = "EMBEDDINGS_FAILED";
    /// Embedding service returned a vector whose length breaks the matrix. Fatal.
    pub const EMBEDDING_DIM_MISMATCH: &str = "EMBEDDING_DIM_MISMATCH";
    /// Concept extraction failed for one chunk. Never fatal; surfaced as a warning.
    pub const EXTRACTION_FAILED: &str = "EXTRACTION_FAILED";
    /// Wraps the first unrecoverable failure during graph construction.
    pub const GRAPH_BUILD_FAILED: &str = "GRAPH_BUILD_FAILED";
    /// An edge would violate a structural invariant of the graph.
    pub const GRAPH_INVARIANT_VIOLATION: &str = "GRAPH_INVARIANT_VIOLATION";
    /// Language model call failed (transport or bad response).
    pub const LLM_FAILED: &str = "LLM_FAILED";
    /// Query-time embedding or ranking failure. Never raised for "no match".
    pub const QUERY_FAILED: &str = "QUERY_FAILED";
    /// Service base URL is not local. Both collaborators are local-only.
    pub const REMOTE_NOT_ALLOWED: &str = "REMOTE_NOT_ALLOWED";
    pub const SERVICE_UNREACHABLE: &str = "SERVICE_UNREACHABLE";
    pub const SERVICE_UNHEALTHY: &str = "SERVICE_UNHEALTHY";
    pub const SESSION_NOT_FOUND: &str = "SESSION_NOT_FOUND";
}

/// Single structured error shape used across the engine and exposed to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RagError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl RagError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Wrap another error as a fatal build failure, preserving its retryable flag.
    pub fn build_failure(inner: &RagError) -> Self {
        RagError::new(codes::GRAPH_BUILD_FAILED, "Knowledge graph build failed")
            .with_details(inner.to_string())
            .with_retryable(inner.retryable)
    }
}

impl fmt::Display for RagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = self.details.as_ref() {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

impl std::error::Error for RagError {}
