use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use grag_ai::embeddings::Embedder;
use grag_ai::llm::Llm;
use grag_ai::{GraphRag, RagConfig};
use grag_core::error::{codes, RagError};
use pretty_assertions::assert_eq;

/// Embedder with a fixed vector per known input; unknown inputs embed to the
/// zero vector (similar to nothing).
struct TableEmbedder(BTreeMap<&'static str, Vec<f32>>);

impl Embedder for TableEmbedder {
    fn embed(&self, _model: &str, input: &str) -> Result<Vec<f32>, RagError> {
        Ok(self.0.get(input).cloned().unwrap_or_else(|| vec![0.0, 0.0]))
    }
}

/// Handles the extraction prompts with canned labels, records the last answer
/// prompt, and can be switched into failure mode for answer synthesis.
struct RecordingLlm {
    fail_answers: AtomicBool,
    last_answer_prompt: Mutex<Option<String>>,
}

impl RecordingLlm {
    fn new() -> Self {
        Self {
            fail_answers: AtomicBool::new(false),
            last_answer_prompt: Mutex::new(None),
        }
    }
}

impl Llm for RecordingLlm {
    fn generate(&self, _model: &str, prompt: &str) -> Result<String, RagError> {
        if prompt.starts_with("You are answering a question") {
            if self.fail_answers.load(Ordering::SeqCst) {
                return Err(RagError::new(codes::LLM_FAILED, "simulated outage"));
            }
            *self.last_answer_prompt.lock().unwrap() = Some(prompt.to_string());
            return Ok("the answer".to_string());
        }
        if prompt.starts_with("Extract the named entities") {
            Ok("A".to_string())
        } else {
            Ok("B".to_string())
        }
    }
}

fn engine() -> (GraphRag, Arc<RecordingLlm>) {
    let embedder = TableEmbedder(BTreeMap::from([
        ("alpha alpha", vec![1.0, 0.0]),
        ("alpha beta", vec![0.95, 0.312_249_9]),
        ("gamma", vec![0.0, 1.0]),
    ]));
    let llm = Arc::new(RecordingLlm::new());
    let rag = GraphRag::new(
        Arc::new(embedder),
        llm.clone(),
        RagConfig::default(),
    );
    (rag, llm)
}

fn document() -> Vec<String> {
    vec![
        "alpha alpha".to_string(),
        "alpha beta".to_string(),
        "gamma".to_string(),
    ]
}

#[test]
fn query_identical_to_a_chunk_ranks_it_first() {
    let (rag, _) = engine();
    let outcome = rag.build(document()).expect("build");
    assert_eq!(outcome.node_count, 3);

    let result = rag.query(&outcome.session_id, "alpha alpha").expect("query");
    assert_eq!(result.traversal_path.first(), Some(&0));
    assert_eq!(result.filtered_content.first().map(String::as_str), Some("alpha alpha"));
    assert_eq!(result.answer, "the answer");
}

#[test]
fn traversal_covers_seeds_then_graph_neighbors() {
    let (rag, llm) = engine();
    let outcome = rag.build(document()).expect("build");

    // Chunks 0 and 1 both clear the relevance threshold; gamma does not.
    let result = rag.query(&outcome.session_id, "alpha alpha").expect("query");
    assert_eq!(result.traversal_path, vec![0, 1]);
    assert_eq!(
        result.filtered_content,
        vec!["alpha alpha".to_string(), "alpha beta".to_string()]
    );

    let prompt = llm
        .last_answer_prompt
        .lock()
        .unwrap()
        .clone()
        .expect("answer prompt recorded");
    assert!(prompt.contains("[[chunk:0]]"));
    assert!(prompt.contains("[[chunk:1]]"));
    assert!(!prompt.contains("[[chunk:2]]"));
}

#[test]
fn no_relevant_content_still_produces_an_answer() {
    let (rag, llm) = engine();
    let outcome = rag.build(document()).expect("build");

    // Unknown query text embeds to the zero vector: every score is 0, below
    // the relevance threshold.
    let result = rag.query(&outcome.session_id, "zeta").expect("query");
    assert!(result.traversal_path.is_empty());
    assert!(result.filtered_content.is_empty());
    assert_eq!(result.answer, "the answer");

    let prompt = llm
        .last_answer_prompt
        .lock()
        .unwrap()
        .clone()
        .expect("answer prompt recorded");
    assert!(prompt.contains("(no relevant excerpts were retrieved)"));
}

#[test]
fn single_chunk_session_answers_from_its_only_chunk() {
    let (rag, _) = engine();
    let outcome = rag.build(vec!["alpha alpha".to_string()]).expect("build");
    assert_eq!(outcome.node_count, 1);
    assert_eq!(outcome.edge_count, 0);

    let result = rag.query(&outcome.session_id, "alpha alpha").expect("query");
    assert_eq!(result.traversal_path, vec![0]);
    assert_eq!(result.filtered_content, vec!["alpha alpha".to_string()]);
}

#[test]
fn empty_query_is_rejected() {
    let (rag, _) = engine();
    let outcome = rag.build(document()).expect("build");
    let err = rag.query(&outcome.session_id, "   ").unwrap_err();
    assert_eq!(err.code, codes::QUERY_FAILED);
}

#[test]
fn empty_document_creates_no_session() {
    let (rag, _) = engine();
    let err = rag.build(Vec::new()).unwrap_err();
    assert_eq!(err.code, codes::GRAPH_BUILD_FAILED);
}

#[test]
fn unknown_session_is_reported_as_not_found() {
    let (rag, _) = engine();
    let err = rag.query("no-such-session", "alpha alpha").unwrap_err();
    assert_eq!(err.code, codes::SESSION_NOT_FOUND);
}

#[test]
fn failed_query_leaves_the_session_intact() {
    let (rag, llm) = engine();
    let outcome = rag.build(document()).expect("build");

    llm.fail_answers.store(true, Ordering::SeqCst);
    let err = rag.query(&outcome.session_id, "alpha alpha").unwrap_err();
    assert_eq!(err.code, codes::LLM_FAILED);

    // The failure is not folded into the statistics and the graph survives.
    let stats = rag.session_stats(&outcome.session_id).expect("stats");
    assert_eq!(stats.query_count, 0);

    llm.fail_answers.store(false, Ordering::SeqCst);
    let result = rag.query(&outcome.session_id, "alpha alpha").expect("retry");
    assert_eq!(result.answer, "the answer");
    let stats = rag.session_stats(&outcome.session_id).expect("stats");
    assert_eq!(stats.query_count, 1);
}
