//! Facade tying the pieces together: build a graph per uploaded document,
//! register it in the session store, answer queries against it.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use grag_core::cache::ConceptCache;
use grag_core::chunk::ChunkStore;
use grag_core::error::{codes, RagError};

use crate::embeddings::Embedder;
use crate::extract::{ConceptExtractor, ExtractionWarning, ExtractorConfig};
use crate::graph::{GraphBuilder, GraphConfig, GraphHandle};
use crate::llm::Llm;
use crate::query::{QueryConfig, QueryEngine, QueryResult};
use crate::session::{SessionStats, SessionStore};

#[derive(Debug, Clone)]
pub struct RagConfig {
    pub embedding_model: String,
    pub llm_model: String,
    pub graph: GraphConfig,
    pub extractor: ExtractorConfig,
    pub query: QueryConfig,
    pub session_ttl_seconds: u64,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embedding_model: "nomic-embed-text".to_string(),
            llm_model: "llama3.1".to_string(),
            graph: GraphConfig::default(),
            extractor: ExtractorConfig::default(),
            query: QueryConfig::default(),
            session_ttl_seconds: 1800,
        }
    }
}

/// Outcome of a successful build, as reported to the upload caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildOutcome {
    pub session_id: String,
    pub node_count: usize,
    pub edge_count: usize,
    /// Per-chunk extraction failures. The graph is still usable; affected
    /// nodes carry empty concept sets.
    pub warnings: Vec<ExtractionWarning>,
}

pub struct GraphRag {
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn Llm>,
    cache: ConceptCache,
    sessions: SessionStore,
    config: RagConfig,
}

impl GraphRag {
    pub fn new(embedder: Arc<dyn Embedder>, llm: Arc<dyn Llm>, config: RagConfig) -> Self {
        Self {
            embedder,
            llm,
            cache: ConceptCache::new(),
            sessions: SessionStore::with_ttl(config.session_ttl_seconds),
            config,
        }
    }

    /// Build a knowledge graph over the document's chunks and open a session
    /// for it. A fatal failure creates no session.
    pub fn build(&self, document_chunks: Vec<String>) -> Result<BuildOutcome, RagError> {
        let store = ChunkStore::from_texts(document_chunks);
        if store.is_empty() {
            return Err(RagError::new(
                codes::GRAPH_BUILD_FAILED,
                "No document chunks provided",
            ));
        }

        let extractor = ConceptExtractor::new(
            self.llm.as_ref(),
            &self.cache,
            &self.config.llm_model,
            self.config.extractor.clone(),
        );
        let builder = GraphBuilder::new(self.config.graph.clone());
        let handle = builder.build(
            &store,
            self.embedder.as_ref(),
            &self.config.embedding_model,
            &extractor,
        )?;

        let outcome = BuildOutcome {
            node_count: handle.graph.node_count(),
            edge_count: handle.graph.edge_count(),
            warnings: handle.warnings.clone(),
            session_id: self.sessions.insert(Arc::new(handle)),
        };
        Ok(outcome)
    }

    /// Answer a query against a session's graph and fold the response time
    /// into the session statistics. A failed query leaves the session and its
    /// graph intact for retry.
    pub fn query(&self, session_id: &str, text: &str) -> Result<QueryResult, RagError> {
        let handle = self.sessions.get(session_id)?;
        let engine = QueryEngine::new(
            self.embedder.as_ref(),
            self.llm.as_ref(),
            &self.config.embedding_model,
            &self.config.llm_model,
            self.config.query.clone(),
        );

        let started = Instant::now();
        let result = engine.query(&handle, text)?;
        self.sessions
            .record_query(session_id, started.elapsed().as_millis() as u64);
        Ok(result)
    }

    /// Direct access to a session's built graph (read-only by construction).
    pub fn handle(&self, session_id: &str) -> Result<Arc<GraphHandle>, RagError> {
        self.sessions.get(session_id)
    }

    pub fn session_stats(&self, session_id: &str) -> Result<SessionStats, RagError> {
        self.sessions.stats(session_id)
    }

    pub fn remove_session(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id)
    }

    pub fn evict_expired_sessions(&self) -> usize {
        self.sessions.evict_expired()
    }
}
