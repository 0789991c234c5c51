//! Answer generation through an OpenAI-compatible chat API
//!
//! Failures are surfaced as [`RagError::Generation`] and never retried here.

use crate::api::prompt::ComposedPrompt;
use crate::config::GenerationConfig;
use crate::error::{RagError, Result};
use crate::ml::embedding::openai_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
};
use async_openai::{Client, config::OpenAIConfig};
use async_trait::async_trait;

/// Trait for text generation from a composed prompt
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Return the model's raw answer text
    async fn generate(&self, prompt: &ComposedPrompt) -> Result<String>;

    /// Get the model being used
    fn model(&self) -> &str;
}

/// OpenAI-compatible chat completion client
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAiGenerator {
    pub fn new(config: &GenerationConfig) -> Self {
        let client = openai_client(config.api_base.as_deref(), &config.api_key_env);

        log::info!(
            "Generation model: {} (temperature {}) via {}",
            config.model,
            config.temperature,
            config.api_base.as_deref().unwrap_or("default OpenAI endpoint")
        );

        Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn build_request(&self, prompt: &ComposedPrompt) -> Result<CreateChatCompletionRequest> {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(prompt.system.clone()),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(prompt.user.clone()),
                name: None,
            }),
        ];

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(messages)
            .temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            args.max_tokens(max_tokens);
        }

        args.build()
            .map_err(|e| RagError::Generation(format!("Invalid chat request: {}", e)))
    }
}

#[async_trait]
impl AnswerGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &ComposedPrompt) -> Result<String> {
        let request = self.build_request(prompt)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| RagError::Generation(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                log::error!("No content in chat response from {}", self.model);
                RagError::Generation("No content in response".to_string())
            })?;

        if content.trim().is_empty() {
            return Err(RagError::Generation("Model returned an empty answer".to_string()));
        }

        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
