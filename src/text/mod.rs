//! Document ingestion and chunking for realestate-rag
//!
//! This module turns source files into normalized page text and splits the
//! pages into overlapping chunks ready for embedding.

pub mod chunking;
pub mod document;
pub mod ingest;
pub mod pdf;

// Re-export main types and functions
pub use chunking::{Chunk, TextChunker};
pub use document::{Page, SourceDocument};
pub use ingest::{IngestReport, Ingestor, SkippedDocument};
pub use pdf::{DocumentLoader, PdfLoader, TextLoader};
