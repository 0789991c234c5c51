//! Embedding and vector retrieval for realestate-rag
//!
//! Chunks are embedded by a remote model and held in an in-memory flat index
//! that is built once at startup and only read afterwards.

pub mod embedding;
pub mod index;
pub mod search;

// Re-export main types and functions
pub use embedding::{Embedding, EmbeddingProvider, OpenAiEmbedder};
pub use index::{
    EmbeddedChunk, IndexStats, RetrievalResult, RetrievedChunk, Retriever, VectorIndex,
    embed_chunks,
};
pub use search::{DistanceMetric, SearchResult, VectorSearchIndex};
