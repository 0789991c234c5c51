//! # realestate-rag
//!
//! Retrieval-augmented real-estate outlook analysis. Market-report PDFs are
//! split into overlapping chunks, embedded into an in-memory vector index, and
//! used as grounding context for a language model that answers per-region
//! outlook questions with a 1–7 investment score.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use realestate_rag::{AnalysisMode, AnalysisPipeline, AnalysisRequest, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Ingest, chunk and index the configured reports
//!     let pipeline = AnalysisPipeline::from_config(&Config::default()).await?;
//!
//!     // Ask for a scored outlook
//!     let request = AnalysisRequest::new("강남구", "", AnalysisMode::Summary);
//!     let result = pipeline.analyze(&request).await?;
//!
//!     println!("Score {}/7: {}", result.score, result.result);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod api;
pub mod config;
pub mod error;
pub mod ml;
pub mod text;
pub mod utils;

// Re-export main API types
pub use api::{
    AnalysisMode, AnalysisPipeline, AnalysisRequest, AnalysisResult, AnswerGenerator,
    ComposedPrompt, OpenAiGenerator, ParsedAnswer, PromptComposer, ScoreParser, run_interactive,
};
pub use config::Config;
pub use error::{RagError, Result};

// Re-export commonly used types
pub use ml::{EmbeddingProvider, OpenAiEmbedder, RetrievalResult, Retriever, VectorIndex};
pub use text::{Chunk, SourceDocument, TextChunker};
