//! Answer generation from a grounding prompt.
//!
//! Generation is a black-box capability: given a prompt, return text or
//! fail. The query pipeline branches on the result and builds a fallback
//! answer on failure, so generation errors never reach the end user.

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Sampling parameters for generation requests.
#[derive(Debug, Clone)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

/// Trait for text generation.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an answer for the given prompt, or fail after retries are
    /// exhausted with `GenerationUnavailable`.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
