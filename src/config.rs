//! Configuration for realestate-rag
//!
//! Every tunable of the pipeline lives here as plain values. The binary loads
//! a JSON file (or uses the defaults) and hands the result to
//! [`AnalysisPipeline::initialize`](crate::api::AnalysisPipeline::initialize).

use crate::error::{RagError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source documents, resolved relative to the working directory
    pub documents: Vec<PathBuf>,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Embedding service configuration
    pub embedding: EmbeddingConfig,
    /// Generation service configuration
    pub generation: GenerationConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Prompt configuration
    pub prompt: PromptConfig,
    /// Score parsing configuration
    pub scoring: ScoringConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            documents: vec![
                PathBuf::from("report.pdf"),
                PathBuf::from("KB주택시장리뷰_2025년 12월호.pdf"),
                PathBuf::from("GTX.pdf"),
                PathBuf::from("2026년 한국 경제 및 부동산 시장 전망 통합 보고서.pdf"),
            ],
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
            generation: GenerationConfig::default(),
            retrieval: RetrievalConfig::default(),
            prompt: PromptConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;

        if self.embedding.batch_size == 0 {
            return Err(RagError::Config(
                "embedding.batch_size must be at least 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.generation.temperature) {
            return Err(RagError::Config(format!(
                "generation.temperature must be within [0, 1], got {}",
                self.generation.temperature
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(RagError::Config("retrieval.top_k must be at least 1".to_string()));
        }

        if !(1..=7).contains(&self.scoring.default_score) {
            return Err(RagError::Config(format!(
                "scoring.default_score must be within 1..=7, got {}",
                self.scoring.default_score
            )));
        }

        Ok(())
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks of the same page
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::Config("chunking.chunk_size must be at least 1".to_string()));
        }
        if self.overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding model name
    pub model: String,
    /// OpenAI-compatible API base URL (`None` uses the client default)
    pub api_base: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Maximum number of texts per embedding request
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            api_base: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            batch_size: 10,
        }
    }
}

/// Generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Chat model name
    pub model: String,
    /// OpenAI-compatible API base URL (`None` uses the client default)
    pub api_base: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Sampling temperature, kept within [0, 1]
    pub temperature: f32,
    /// Optional cap on generated tokens
    pub max_tokens: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            api_base: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.3,
            max_tokens: None,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the prompt
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 6 }
    }
}

/// Prompt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Upper bound on spliced context characters
    pub max_context_chars: usize,
    /// Year named in the question; `None` means the current year
    pub outlook_year: Option<i32>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 12_000,
            outlook_year: None,
        }
    }
}

/// Score parsing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Score reported when the model omits the tag
    pub default_score: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { default_score: 4 }
    }
}
