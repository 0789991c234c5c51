//! Exact vector similarity search
//!
//! A flat index that scores every stored vector against the query. Scoring
//! runs in parallel with rayon; results are ordered by descending similarity
//! with ties kept in insertion order, so a fixed index and query always give
//! the same ranking.

use crate::error::{RagError, Result};
use crate::ml::embedding::Embedding;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Similarity metrics supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DistanceMetric {
    /// Cosine similarity (OpenAI embeddings are normalized, so this ranks like the dot product)
    #[default]
    Cosine,
    /// Raw inner product
    DotProduct,
}

/// Search hit: position in the index plus similarity (higher = closer)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: usize,
    pub similarity: f32,
}

/// Flat vector index with a fixed dimension
#[derive(Debug, Clone)]
pub struct VectorSearchIndex {
    vectors: Vec<Embedding>,
    dimension: usize,
    metric: DistanceMetric,
}

impl VectorSearchIndex {
    /// Create new vector search index
    pub fn new(dimension: usize, metric: DistanceMetric) -> Result<Self> {
        if dimension == 0 {
            return Err(RagError::Embedding(
                "Embedding dimension must be non-zero".to_string(),
            ));
        }

        Ok(Self {
            vectors: Vec::new(),
            dimension,
            metric,
        })
    }

    /// Add a vector; its id is its insertion position
    pub fn add_vector(&mut self, vector: Embedding) -> Result<usize> {
        if vector.len() != self.dimension {
            return Err(RagError::Embedding(format!(
                "Vector dimension {} doesn't match index dimension {}",
                vector.len(),
                self.dimension
            )));
        }

        self.vectors.push(vector);
        Ok(self.vectors.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn vector(&self, id: usize) -> Option<&[f32]> {
        self.vectors.get(id).map(Vec::as_slice)
    }

    /// Return the `k` most similar vectors, best first
    pub fn search_exact(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.dimension {
            return Err(RagError::Embedding(format!(
                "Query dimension {} doesn't match index dimension {}",
                query.len(),
                self.dimension
            )));
        }

        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<SearchResult> = self
            .vectors
            .par_iter()
            .enumerate()
            .map(|(id, vector)| {
                let similarity = Self::similarity(self.metric, query, vector);
                SearchResult {
                    id,
                    similarity: if similarity.is_nan() {
                        f32::NEG_INFINITY
                    } else {
                        similarity
                    },
                }
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(k);

        Ok(scored)
    }

    /// Similarity under the given metric
    pub fn similarity(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
        match metric {
            DistanceMetric::Cosine => Self::cosine_similarity(a, b),
            DistanceMetric::DotProduct => Self::dot_product(a, b),
        }
    }

    /// Cosine similarity; zero vectors are treated as unrelated
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot = Self::dot_product(a, b);
        let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            dot / (norm_a * norm_b)
        }
    }

    fn dot_product(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }
}
