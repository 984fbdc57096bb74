//! OpenAI chat completion generator.

use super::{Generator, SamplingParams};
use crate::error::{LectioError, Result};
use crate::openai::create_client;
use crate::retry::RetryPolicy;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI-based generator with bounded retry.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    system_prompt: String,
    sampling: SamplingParams,
    retry: RetryPolicy,
}

impl OpenAIGenerator {
    /// Create a new generator.
    pub fn new(
        model: &str,
        system_prompt: &str,
        sampling: SamplingParams,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            system_prompt: system_prompt.to_string(),
            sampling,
            retry,
        }
    }

    async fn request_completion(&self, prompt: &str) -> std::result::Result<String, String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| format!("Failed to build system message: {}", e))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| format!("Failed to build user message: {}", e))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(self.sampling.max_tokens)
            .temperature(self.sampling.temperature)
            .build()
            .map_err(|e| format!("Failed to build request: {}", e))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| format!("Chat API error: {}", e))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| "Empty response from model".to_string())
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let answer = self
            .retry
            .run("generation request", || self.request_completion(prompt))
            .await
            .map_err(|e| LectioError::GenerationUnavailable {
                attempts: e.attempts,
                message: e.message,
            })?;

        debug!("Generated {} characters", answer.len());
        Ok(answer)
    }
}
