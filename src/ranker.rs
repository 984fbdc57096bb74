//! Similarity ranking over a loaded corpus.
//!
//! Corpus embeddings are unit-normalized once at index build time into a
//! single row-major matrix, so each query is one dot-product pass over a
//! contiguous buffer.

use crate::corpus::{Chunk, Corpus};
use crate::error::{LectioError, Result};

/// Epsilon added to the L2 norm so an all-zero vector divides cleanly and
/// scores 0 against everything.
const NORM_EPSILON: f32 = 1e-8;

/// One retrieved chunk with its cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

/// Read-only retrieval index over an immutable corpus.
pub struct CorpusIndex {
    corpus: Corpus,
    /// Unit-normalized embeddings, row-major with stride `dimensions`.
    normalized: Vec<f32>,
}

impl CorpusIndex {
    /// Build the index, normalizing every corpus embedding.
    pub fn new(corpus: Corpus) -> Self {
        let dims = corpus.dimensions();
        let mut normalized = Vec::with_capacity(corpus.len() * dims);
        for chunk in corpus.chunks() {
            normalized.extend(normalize(&chunk.embedding));
        }
        Self { corpus, normalized }
    }

    /// The underlying corpus.
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Rank all chunks against the query vector and return the top `top_k`
    /// by descending cosine similarity. Ties keep corpus order; fewer than
    /// `top_k` chunks is not an error.
    pub fn rank(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredChunk<'_>>> {
        let dims = self.corpus.dimensions();
        if query.len() != dims {
            return Err(LectioError::DimensionMismatch {
                expected: dims,
                actual: query.len(),
            });
        }

        let query = normalize(query);
        let scores: Vec<f32> = self
            .normalized
            .chunks_exact(dims)
            .map(|row| row.iter().zip(&query).map(|(a, b)| a * b).sum())
            .collect();

        let mut order: Vec<usize> = (0..scores.len()).collect();
        // sort_by is stable, so equal scores keep corpus order.
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order.truncate(top_k);

        Ok(order
            .into_iter()
            .map(|i| ScoredChunk {
                chunk: &self.corpus.chunks()[i],
                score: scores[i],
            })
            .collect())
    }
}

/// Scale a vector to unit L2 norm, with an epsilon guard for zero vectors.
fn normalize(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt() + NORM_EPSILON;
    vector.iter().map(|x| x / norm).collect()
}
