//! Rectangular embedding matrix over the chunk sequence, row i aligned with
//! chunk i, plus the cosine-similarity primitives built on it.

use grag_core::chunk::ChunkStore;
use grag_core::error::{codes, RagError};

use super::Embedder;

pub fn l2_norm(v: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for x in v {
        sum += x * x;
    }
    sum.sqrt()
}

/// Cosine similarity with precomputed norms. Zero-norm vectors compare as 0.
pub fn cosine(a: &[f32], b: &[f32], a_norm: f32, b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    let mut dot = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
    }
    dot / (a_norm * b_norm)
}

/// One embedding row per chunk; rectangular by construction. A single chunk
/// still yields a one-row matrix.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    vectors: Vec<Vec<f32>>,
    norms: Vec<f32>,
    dims: usize,
}

impl EmbeddingMatrix {
    /// Assemble rows into a matrix. The first row fixes the dimension; any
    /// mismatching row is fatal since similarity needs a rectangular matrix.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, RagError> {
        let dims = rows.first().map(|r| r.len()).unwrap_or(0);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dims {
                return Err(RagError::new(
                    codes::EMBEDDING_DIM_MISMATCH,
                    "Embedding dimension mismatch across chunks",
                )
                .with_details(format!("expected={dims}; got={}; chunk_index={i}", row.len())));
            }
        }
        let norms = rows.iter().map(|r| l2_norm(r)).collect();
        Ok(Self {
            vectors: rows,
            norms,
            dims,
        })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn row(&self, i: usize) -> Option<&[f32]> {
        self.vectors.get(i).map(|v| v.as_slice())
    }

    /// Cosine similarity between two rows.
    pub fn similarity(&self, i: usize, j: usize) -> f32 {
        cosine(&self.vectors[i], &self.vectors[j], self.norms[i], self.norms[j])
    }

    /// Cosine similarity of an external vector (a query embedding) against
    /// every row, index-aligned.
    pub fn similarity_to_rows(&self, v: &[f32]) -> Result<Vec<f32>, RagError> {
        if !self.is_empty() && v.len() != self.dims {
            return Err(RagError::new(
                codes::EMBEDDING_DIM_MISMATCH,
                "Query embedding dimension does not match the chunk matrix",
            )
            .with_details(format!("expected={}; got={}", self.dims, v.len())));
        }
        let v_norm = l2_norm(v);
        Ok((0..self.vectors.len())
            .map(|i| cosine(v, &self.vectors[i], v_norm, self.norms[i]))
            .collect())
    }
}

/// Embed every chunk, one service call per chunk, index-aligned.
pub fn embed_all(
    store: &ChunkStore,
    embedder: &dyn Embedder,
    model: &str,
) -> Result<EmbeddingMatrix, RagError> {
    let mut rows = Vec::with_capacity(store.len());
    for chunk in store.iter() {
        let v = embedder.embed(model, &chunk.content).map_err(|e| {
            RagError::new(codes::EMBEDDINGS_FAILED, "Failed to embed chunk")
                .with_details(format!("chunk_index={}; err={}", chunk.index, e))
                .with_retryable(e.retryable)
        })?;
        rows.push(v);
    }
    EmbeddingMatrix::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grag_core::error::codes;

    struct FixedEmbedder(Vec<Vec<f32>>);

    impl Embedder for FixedEmbedder {
        fn embed(&self, _model: &str, input: &str) -> Result<Vec<f32>, RagError> {
            let i: usize = input.trim().parse().unwrap();
            Ok(self.0[i].clone())
        }
    }

    #[test]
    fn single_chunk_yields_one_row_matrix() {
        let store = ChunkStore::from_texts(vec!["0".to_string()]);
        let embedder = FixedEmbedder(vec![vec![1.0, 0.0, 0.0]]);
        let matrix = embed_all(&store, &embedder, "mock").expect("matrix");
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.dims(), 3);
        assert_eq!(matrix.row(0), Some([1.0, 0.0, 0.0].as_slice()));
    }

    #[test]
    fn dimension_mismatch_is_fatal() {
        let store = ChunkStore::from_texts(vec!["0".to_string(), "1".to_string()]);
        let embedder = FixedEmbedder(vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]]);
        let err = embed_all(&store, &embedder, "mock").unwrap_err();
        assert_eq!(err.code, codes::EMBEDDING_DIM_MISMATCH);
    }

    #[test]
    fn similarity_is_symmetric_with_unit_diagonal() {
        let matrix = EmbeddingMatrix::from_rows(vec![
            vec![1.0, 0.0],
            vec![0.6, 0.8],
            vec![0.0, 1.0],
        ])
        .expect("matrix");
        for i in 0..3 {
            assert!((matrix.similarity(i, i) - 1.0).abs() < 1e-6);
            for j in 0..3 {
                assert!((matrix.similarity(i, j) - matrix.similarity(j, i)).abs() < 1e-6);
            }
        }
        assert!((matrix.similarity(0, 1) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn zero_norm_vectors_compare_as_zero() {
        let matrix =
            EmbeddingMatrix::from_rows(vec![vec![0.0, 0.0], vec![1.0, 0.0]]).expect("matrix");
        assert_eq!(matrix.similarity(0, 1), 0.0);
    }

    #[test]
    fn query_similarity_checks_dimension() {
        let matrix = EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0]]).expect("matrix");
        let err = matrix.similarity_to_rows(&[1.0, 0.0, 0.0]).unwrap_err();
        assert_eq!(err.code, codes::EMBEDDING_DIM_MISMATCH);

        let scores = matrix.similarity_to_rows(&[1.0, 0.0]).expect("scores");
        assert!((scores[0] - 1.0).abs() < 1e-6);
    }
}
