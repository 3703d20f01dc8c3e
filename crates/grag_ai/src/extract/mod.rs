//! Concurrent concept extraction.
//!
//! For each distinct chunk content the language model is asked twice: once
//! for named entities, once for general concepts excluding named entities.
//! The two lists are unioned and deduplicated by exact string equality.
//! Results are memoized on a content hash, so duplicate-content chunks share
//! one extraction without re-invoking the model.
//!
//! A failing extraction degrades that chunk to an empty concept set and is
//! surfaced as a per-chunk warning; it never aborts the rest of the batch.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use grag_core::cache::ConceptCache;
use grag_core::chunk::ChunkStore;
use grag_core::error::{codes, RagError};
use grag_core::text::{clean_concept, content_hash, lemmatize};

use crate::llm::Llm;

pub mod prompts;

/// Non-fatal, per-chunk extraction failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionWarning {
    pub chunk_index: usize,
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Upper bound on concurrent extraction tasks (each issues two LLM calls).
    pub max_concurrency: usize,
    /// Opt-in label normalization via `grag_core::text::lemmatize`. The
    /// contract only requires exact-string dedup, so this is off by default.
    pub normalize_concepts: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            normalize_concepts: false,
        }
    }
}

pub struct ConceptExtractor<'a> {
    llm: &'a dyn Llm,
    cache: &'a ConceptCache,
    model: &'a str,
    config: ExtractorConfig,
}

impl<'a> ConceptExtractor<'a> {
    pub fn new(
        llm: &'a dyn Llm,
        cache: &'a ConceptCache,
        model: &'a str,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            llm,
            cache,
            model,
            config,
        }
    }

    /// Concept sets for every chunk, index-aligned, plus warnings for chunks
    /// whose extraction failed (those get an empty set).
    pub fn extract_all(
        &self,
        store: &ChunkStore,
    ) -> Result<(Vec<BTreeSet<String>>, Vec<ExtractionWarning>), RagError> {
        // Group chunk indices by content hash; extraction runs once per hash.
        let mut by_hash: BTreeMap<String, (String, Vec<usize>)> = BTreeMap::new();
        for chunk in store.iter() {
            by_hash
                .entry(content_hash(&chunk.content))
                .or_insert_with(|| (chunk.content.clone(), Vec::new()))
                .1
                .push(chunk.index);
        }

        let mut resolved: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut pending: Vec<(String, String)> = Vec::new();
        for (hash, (content, _)) in by_hash.iter() {
            match self.cache.get(hash) {
                Some(cached) => {
                    resolved.insert(hash.clone(), cached);
                }
                None => pending.push((hash.clone(), content.clone())),
            }
        }

        let mut failures: BTreeMap<String, RagError> = BTreeMap::new();
        if !pending.is_empty() {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.max_concurrency.max(1))
                .build()
                .map_err(|e| {
                    RagError::new(
                        codes::GRAPH_BUILD_FAILED,
                        "Failed to start extraction worker pool",
                    )
                    .with_details(e.to_string())
                })?;

            let extracted: Vec<(String, Result<BTreeSet<String>, RagError>)> = pool.install(|| {
                pending
                    .par_iter()
                    .map(|(hash, content)| (hash.clone(), self.extract_one(content)))
                    .collect()
            });

            for (hash, result) in extracted {
                match result {
                    Ok(concepts) => {
                        self.cache.insert(&hash, concepts.clone());
                        resolved.insert(hash, concepts);
                    }
                    Err(e) => {
                        tracing::warn!(
                            content_hash = %hash,
                            error = %e,
                            "concept extraction failed; chunk degrades to an empty concept set"
                        );
                        failures.insert(hash, e);
                    }
                }
            }
        }

        let mut concepts = vec![BTreeSet::new(); store.len()];
        let mut warnings = Vec::new();
        for (hash, (_, indices)) in by_hash.iter() {
            if let Some(set) = resolved.get(hash) {
                for &i in indices {
                    concepts[i] = set.clone();
                }
            } else if let Some(err) = failures.get(hash) {
                for &i in indices {
                    warnings.push(ExtractionWarning {
                        chunk_index: i,
                        code: codes::EXTRACTION_FAILED.to_string(),
                        message: "Concept extraction failed for chunk".to_string(),
                        details: Some(err.to_string()),
                    });
                }
            }
        }
        warnings.sort_by_key(|w| w.chunk_index);
        Ok((concepts, warnings))
    }

    /// Two independent model calls per content; union of both label lists.
    fn extract_one(&self, content: &str) -> Result<BTreeSet<String>, RagError> {
        let entities = self
            .llm
            .generate(self.model, &prompts::named_entities_prompt(content))?;
        let general = self
            .llm
            .generate(self.model, &prompts::key_concepts_prompt(content))?;

        let mut out = BTreeSet::new();
        for raw in entities
            .split(|c| c == ',' || c == '\n')
            .chain(general.split(|c| c == ',' || c == '\n'))
        {
            let label = clean_concept(raw);
            if label.is_empty() {
                continue;
            }
            let label = if self.config.normalize_concepts {
                lemmatize(&label)
            } else {
                label
            };
            out.insert(label);
        }
        Ok(out)
    }
}
