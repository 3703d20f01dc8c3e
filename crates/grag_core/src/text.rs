use sha2::{Digest, Sha256};

/// Content-addressed key for a chunk's text. Two chunks with identical text
/// hash to the same key and share cached extraction results.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Clean one label as emitted by the language model: strip list markers,
/// wrapping quotes, and trailing punctuation. Returns an empty string when
/// nothing usable remains.
pub fn clean_concept(raw: &str) -> String {
    let mut s = raw.trim();
    // Leading bullet / enumeration markers ("- ", "* ", "1. ", "3)").
    s = s.trim_start_matches(|c: char| c == '-' || c == '*' || c == '\u{2022}');
    s = s.trim_start();
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &s[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            s = stripped;
        }
    }
    // Trailing punctuation first, then wrapping quotes, e.g. `"embeddings",`.
    let s = s
        .trim()
        .trim_end_matches(|c: char| c == '.' || c == ',' || c == ';')
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim();
    s.to_string()
}

/// Naive lemmatizer for concept labels: lowercases and singularizes each word.
///
/// Not required by the extraction contract (dedup is exact-string), offered as
/// an opt-in normalization so labels like "Neural Networks" and
/// "neural network" collide.
pub fn lemmatize(concept: &str) -> String {
    concept
        .to_lowercase()
        .split_whitespace()
        .map(singularize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() >= 2 {
            return format!("{stem}y");
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.len() <= 3 {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("es") {
        if stem.ends_with("sh") || stem.ends_with("ch") || stem.ends_with('x') || stem.ends_with('z')
        {
            return stem.to_string();
        }
    }
    word.strip_suffix('s').map_or_else(|| word.to_string(), str::to_string)
}
