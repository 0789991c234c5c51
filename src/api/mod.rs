//! API layer for realestate-rag
//!
//! This module provides the request/response types, the prompt composer, the
//! answer generator, the score parser and the pipeline context that ties them
//! to the vector index.

pub mod chat;
pub mod generator;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod types;

// Re-export main API types
pub use chat::run_interactive;
pub use generator::{AnswerGenerator, OpenAiGenerator};
pub use parser::{ParsedAnswer, ScoreParser};
pub use pipeline::AnalysisPipeline;
pub use prompt::{ComposedPrompt, PromptComposer, CONTEXT_PLACEHOLDER, SCORE_LEVELS};
pub use types::{AnalysisMode, AnalysisRequest, AnalysisResult};
