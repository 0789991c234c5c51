//! Shared test doubles for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use realestate_rag::api::{AnswerGenerator, ComposedPrompt};
use realestate_rag::config::{ChunkingConfig, Config, PromptConfig};
use realestate_rag::ml::{Embedding, EmbeddingProvider, RetrievalResult, Retriever};
use realestate_rag::text::Chunk;
use realestate_rag::{RagError, Result};
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const VOCABULARY: [&str; 6] = ["강남", "마포", "GTX", "재건축", "금리", "학군"];

/// Embeds text as keyword counts over [`VOCABULARY`] plus a small bias term
#[derive(Default)]
pub struct KeywordEmbedder {
    pub calls: AtomicUsize,
}

pub fn keyword_vector(text: &str) -> Embedding {
    let mut vector: Embedding = VOCABULARY
        .iter()
        .map(|word| text.matches(word).count() as f32)
        .collect();
    vector.push(0.01);
    vector
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|text| keyword_vector(text)).collect())
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Fails every batch request
#[derive(Default)]
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Embedding>> {
        Err(RagError::Embedding("rate limited".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Returns a fixed answer and records every prompt it receives
pub struct ScriptedGenerator {
    answer: String,
    pub prompts: Mutex<Vec<ComposedPrompt>>,
}

impl ScriptedGenerator {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl AnswerGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &ComposedPrompt) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        Ok(self.answer.clone())
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Always fails like an unreachable endpoint
pub struct FailingGenerator;

#[async_trait]
impl AnswerGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &ComposedPrompt) -> Result<String> {
        Err(RagError::Generation("connection refused".to_string()))
    }

    fn model(&self) -> &str {
        "failing"
    }
}

/// Serves fixed chunks and counts how often it was asked
pub struct CountingRetriever {
    chunks: Vec<Chunk>,
    pub calls: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

impl CountingRetriever {
    pub fn new(texts: &[&str]) -> Self {
        let chunks = texts
            .iter()
            .enumerate()
            .map(|(index, text)| Chunk {
                source: "report.pdf".to_string(),
                page: 0,
                index,
                offset: 0,
                length: text.chars().count(),
                text: text.to_string(),
            })
            .collect();

        Self {
            chunks,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Retriever for CountingRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievalResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        Ok(RetrievalResult::from_ranked_chunks(
            self.chunks.iter().take(k).cloned().collect(),
        ))
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }
}

/// Configuration over the given documents with small chunks and a fixed year
pub fn test_config(documents: Vec<PathBuf>) -> Config {
    Config {
        documents,
        chunking: ChunkingConfig {
            chunk_size: 60,
            overlap: 10,
        },
        prompt: PromptConfig {
            max_context_chars: 12_000,
            outlook_year: Some(2026),
        },
        ..Config::default()
    }
}
