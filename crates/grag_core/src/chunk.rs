use serde::{Deserialize, Serialize};

/// A contiguous slice of a source document's text: the unit of embedding,
/// concept extraction, and graph-node identity. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub content: String,
}

/// Ordered sequence of chunks produced by the upstream document splitter.
///
/// Index equals position in the input sequence and is the sole cross-reference
/// key used by every other component. Chunks are never reordered, merged, or
/// deleted within one graph's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkStore {
    chunks: Vec<Chunk>,
}

impl ChunkStore {
    pub fn from_texts(texts: Vec<String>) -> Self {
        let chunks = texts
            .into_iter()
            .enumerate()
            .map(|(index, content)| Chunk { index, content })
            .collect();
        Self { chunks }
    }

    pub fn get(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }
}
