//! Embedding generation through an OpenAI-compatible API
//!
//! The embedding model is a remote service. [`EmbeddingProvider`] is the seam
//! the index builds against; [`OpenAiEmbedder`] is the production
//! implementation.

use crate::config::EmbeddingConfig;
use crate::error::{RagError, Result};
use async_openai::types::CreateEmbeddingRequestArgs;
use async_openai::{Client, config::OpenAIConfig};
use async_trait::async_trait;
use std::time::Duration;

/// Embedding vector type
pub type Embedding = Vec<f32>;

/// Trait for generating text embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for multiple texts in one request, in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| RagError::Embedding("Empty embedding response".to_string()))
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Build an OpenAI client configuration from an optional base URL and the
/// name of the environment variable holding the key.
pub(crate) fn openai_config(api_base: Option<&str>, api_key_env: &str) -> OpenAIConfig {
    let mut config = OpenAIConfig::new();

    match std::env::var(api_key_env) {
        Ok(key) => config = config.with_api_key(key),
        Err(_) => log::warn!("{} is not set; remote calls will likely be rejected", api_key_env),
    }

    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }

    config
}

/// Build an OpenAI client that never retries.
///
/// async-openai retries rate-limited (429) requests with exponential backoff
/// by default; a zero elapsed-time budget makes the first failure final.
pub(crate) fn openai_client(api_base: Option<&str>, api_key_env: &str) -> Client<OpenAIConfig> {
    let no_retry = backoff::ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build();

    Client::with_config(openai_config(api_base, api_key_env)).with_backoff(no_retry)
}

/// OpenAI-compatible embedding client
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Self {
        let client = openai_client(config.api_base.as_deref(), &config.api_key_env);

        log::info!(
            "Embedding model: {} via {}",
            config.model,
            config.api_base.as_deref().unwrap_or("default OpenAI endpoint")
        );

        Self {
            client,
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(texts.to_vec())
            .build()
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        let mut data = response.data;
        if data.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "Requested {} embeddings but received {}",
                texts.len(),
                data.len()
            )));
        }

        data.sort_by_key(|item| item.index);
        Ok(data.into_iter().map(|item| item.embedding).collect())
    }

    fn name(&self) -> &str {
        &self.model
    }
}
