//! Error types for realestate-rag
//!
//! This module provides error handling for every stage of the pipeline:
//! document ingestion, chunking, embedding, retrieval, generation and
//! request validation.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum RagError {
    /// A configured document path does not exist
    #[error("Document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    /// PDF processing errors
    #[error("PDF processing error: {0}")]
    Pdf(String),

    /// Text processing errors
    #[error("Text processing error: {0}")]
    TextProcessing(String),

    /// An embedding batch failed while the index was being built
    #[error("Embedding batch {batch} failed: {message}")]
    EmbeddingBatch { batch: usize, message: String },

    /// Embedding errors outside of the index build (query embedding)
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// The vector index was never built; the service is degraded
    #[error("RAG index unavailable: {0}")]
    IndexUnavailable(String),

    /// Remote generation failures and malformed model output
    #[error("Generation error: {0}")]
    Generation(String),

    /// Caller supplied an unusable request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RagError {
    /// Whether the error reflects degraded mode rather than a single bad request.
    ///
    /// A transport layer maps this to "service unavailable" and everything
    /// else to a generic server error.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, RagError::IndexUnavailable(_))
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RagError>;
