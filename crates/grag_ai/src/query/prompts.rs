/// Final answer synthesis prompt. The evidence section may legitimately be
/// empty: retrieval degrades gracefully and the model is still asked for a
/// best-effort answer.
pub fn answer_prompt(question: &str, excerpt_blocks: &str) -> String {
    let excerpts = if excerpt_blocks.trim().is_empty() {
        "(no relevant excerpts were retrieved)"
    } else {
        excerpt_blocks
    };
    format!(
        r#"You are answering a question about an uploaded document using the excerpts provided below.

Rules (non-negotiable):
1) Prefer the excerpts over your own knowledge. Do not invent document contents.
2) If the excerpts do not contain enough information, say so plainly and give your best partial answer.
3) Quote short phrases from the excerpts where it strengthens the answer.

Question:
{question}

Excerpts:
{excerpts}

Output:
- Return plain text only.
"#
    )
}

pub fn excerpt_block(chunk_index: usize, text: &str) -> String {
    format!("[[chunk:{chunk_index}]]\n{text}")
}
