//! Chunk index: embeds chunks once at startup and answers top-k queries
//!
//! The index is built in a single pass and is read-only afterwards, so one
//! instance can be shared across any number of concurrent requests.
//! Embedding happens in batches no larger than the configured batch size; the
//! first failing batch aborts the whole build and nothing partial is kept.

use crate::error::{RagError, Result};
use crate::ml::embedding::{Embedding, EmbeddingProvider};
use crate::ml::search::{DistanceMetric, VectorSearchIndex};
use crate::text::Chunk;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// A chunk together with its embedding
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub vector: Embedding,
}

/// One retrieved chunk and its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    pub similarity: f32,
}

/// Chunks judged most similar to a query, best first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalResult {
    pub hits: Vec<RetrievedChunk>,
}

impl RetrievalResult {
    /// Wrap chunks that are already in rank order
    pub fn from_ranked_chunks(chunks: Vec<Chunk>) -> Self {
        let hits = chunks
            .into_iter()
            .map(|chunk| RetrievedChunk {
                chunk,
                similarity: 1.0,
            })
            .collect();
        Self { hits }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Chunk texts in rank order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.hits.iter().map(|hit| hit.chunk.text.as_str())
    }
}

/// Anything that can return the k chunks closest to a query
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return at most `k` chunks, exactly `min(k, len)` when non-empty
    async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievalResult>;

    /// Number of chunks available
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Index build statistics
#[derive(Debug, Clone)]
pub struct IndexStats {
    pub total_chunks: usize,
    pub batches: usize,
    pub dimension: usize,
    pub build_seconds: f64,
}

/// Embedding-backed chunk index
pub struct VectorIndex {
    chunks: Vec<Chunk>,
    search: VectorSearchIndex,
    embedder: Arc<dyn EmbeddingProvider>,
    stats: IndexStats,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("chunks", &self.chunks.len())
            .field("embedder", &self.embedder.name())
            .field("stats", &self.stats)
            .finish()
    }
}

impl VectorIndex {
    /// Embed and index `chunks`
    pub async fn build(
        chunks: Vec<Chunk>,
        embedder: Arc<dyn EmbeddingProvider>,
        batch_size: usize,
    ) -> Result<Self> {
        Self::build_with_progress(chunks, embedder, batch_size, |_, _| {}).await
    }

    /// Embed and index `chunks`, reporting `(embedded, total)` after each batch
    pub async fn build_with_progress<F>(
        chunks: Vec<Chunk>,
        embedder: Arc<dyn EmbeddingProvider>,
        batch_size: usize,
        progress: F,
    ) -> Result<Self>
    where
        F: Fn(usize, usize),
    {
        let start_time = Instant::now();
        let embedded = embed_chunks(chunks, embedder.as_ref(), batch_size, progress).await?;
        let batches = embedded.len().div_ceil(batch_size.max(1));

        let mut index = Self::from_embedded(embedded, embedder)?;
        index.stats.batches = batches;
        index.stats.build_seconds = start_time.elapsed().as_secs_f64();

        log::info!(
            "✅ Vector index ready: {} chunks, dimension {}, {} batches in {:.2}s",
            index.stats.total_chunks,
            index.stats.dimension,
            index.stats.batches,
            index.stats.build_seconds
        );

        Ok(index)
    }

    /// Assemble an index from chunks that already carry vectors.
    ///
    /// `embedder` must be the model that produced the vectors; it embeds queries.
    pub fn from_embedded(
        embedded: Vec<EmbeddedChunk>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let dimension = embedded
            .first()
            .map(|entry| entry.vector.len())
            .ok_or_else(|| RagError::IndexUnavailable("no chunks to index".to_string()))?;

        let mut search = VectorSearchIndex::new(dimension, DistanceMetric::Cosine)?;
        let mut chunks = Vec::with_capacity(embedded.len());

        for entry in embedded {
            search.add_vector(entry.vector)?;
            chunks.push(entry.chunk);
        }

        let stats = IndexStats {
            total_chunks: chunks.len(),
            batches: 0,
            dimension: search.dimension(),
            build_seconds: 0.0,
        };

        Ok(Self {
            chunks,
            search,
            embedder,
            stats,
        })
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// The stored chunk and vector at `id`
    pub fn get(&self, id: usize) -> Option<(&Chunk, &[f32])> {
        Some((self.chunks.get(id)?, self.search.vector(id)?))
    }

    /// Embed `text` and return the `k` most similar chunks
    pub async fn query(&self, text: &str, k: usize) -> Result<RetrievalResult> {
        if k == 0 {
            return Ok(RetrievalResult::default());
        }

        let query_vector = self.embedder.embed(text).await?;
        let results = self.search.search_exact(&query_vector, k)?;

        let hits = results
            .into_iter()
            .map(|result| RetrievedChunk {
                chunk: self.chunks[result.id].clone(),
                similarity: result.similarity,
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Retrieved {} chunks for '{}' (best similarity {:.3})",
            hits.len(),
            crate::utils::preview(text, 60),
            hits.first().map(|h| h.similarity).unwrap_or(0.0)
        );

        Ok(RetrievalResult { hits })
    }
}

#[async_trait]
impl Retriever for VectorIndex {
    async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievalResult> {
        self.query(query, k).await
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }
}

/// Embed chunk texts in batches of at most `batch_size`.
///
/// Every chunk is embedded or the call fails; a batch error or a response of
/// the wrong shape is reported as [`RagError::EmbeddingBatch`].
pub async fn embed_chunks<F>(
    chunks: Vec<Chunk>,
    embedder: &dyn EmbeddingProvider,
    batch_size: usize,
    progress: F,
) -> Result<Vec<EmbeddedChunk>>
where
    F: Fn(usize, usize),
{
    if batch_size == 0 {
        return Err(RagError::Config("embedding batch size must be at least 1".to_string()));
    }
    if chunks.is_empty() {
        return Err(RagError::IndexUnavailable("no chunks to index".to_string()));
    }

    let total = chunks.len();
    log::info!(
        "🧠 Embedding {} chunks with {} in batches of {}...",
        total,
        embedder.name(),
        batch_size
    );

    let mut embedded = Vec::with_capacity(total);
    let mut dimension: Option<usize> = None;

    for (batch, group) in chunks.chunks(batch_size).enumerate() {
        let texts: Vec<String> = group.iter().map(|chunk| chunk.text.clone()).collect();

        let vectors = embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| RagError::EmbeddingBatch {
                batch,
                message: e.to_string(),
            })?;

        if vectors.len() != group.len() {
            return Err(RagError::EmbeddingBatch {
                batch,
                message: format!(
                    "expected {} vectors, received {}",
                    group.len(),
                    vectors.len()
                ),
            });
        }

        for (chunk, vector) in group.iter().zip(vectors) {
            let expected = *dimension.get_or_insert(vector.len());
            if vector.len() != expected || expected == 0 {
                return Err(RagError::EmbeddingBatch {
                    batch,
                    message: format!(
                        "vector dimension {} differs from index dimension {}",
                        vector.len(),
                        expected
                    ),
                });
            }
            embedded.push(EmbeddedChunk {
                chunk: chunk.clone(),
                vector,
            });
        }

        log::debug!("Embedded batch {} ({} chunks)", batch, group.len());
        progress(embedded.len(), total);
    }

    Ok(embedded)
}
