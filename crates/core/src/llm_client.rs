//! Text Generation Client
//!
//! A single-attempt [`TextGenerator`] seam, an implementation for any
//! OpenAI-compatible chat-completions endpoint, and the [`TextClient`] that
//! wraps a generator with the retry and backoff policy.

use crate::error::GenerationError;
use anyhow::Result;
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

/// One raw round-trip to a hosted model.
///
/// `Ok(None)` means the call went through but produced no text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Option<String>>;
}

/// A `TextGenerator` for any OpenAI-compatible API.
///
/// The credential and base URL live in the `OpenAIConfig`, so Gemini is
/// reached through Google's OpenAI-compatible endpoint.
pub struct OpenAICompatibleGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleGenerator {
    /// Creates a new generator.
    ///
    /// # Arguments
    ///
    /// * `config` - API key and base URL for the provider.
    /// * `model` - Model identifier used for every request.
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAICompatibleGenerator {
    async fn complete(&self, prompt: &str) -> Result<Option<String>> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

/// How often and how patiently a [`TextClient`] retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay unit; attempt `n` waits `base_delay * 2^n` before the next one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff to wait after the failed attempt `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Issues prompts through a [`TextGenerator`] with retries.
#[derive(Clone)]
pub struct TextClient {
    generator: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
}

impl TextClient {
    pub fn new(generator: Arc<dyn TextGenerator>, policy: RetryPolicy) -> Self {
        Self { generator, policy }
    }

    /// Sends `prompt` and returns the model's raw text.
    ///
    /// Raised errors are retried with exponential backoff until the policy's
    /// attempts run out. An empty reply ends the call immediately with
    /// [`GenerationError::NoResponse`]; it is not retried.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let attempts = self.policy.max_attempts.max(1);
        for attempt in 0..attempts {
            match self.generator.complete(prompt).await {
                Ok(Some(text)) if !text.is_empty() => {
                    debug!(attempt, chars = text.len(), "Model returned text");
                    return Ok(text);
                }
                Ok(_) => {
                    warn!(attempt, "Model returned an empty response");
                    return Err(GenerationError::NoResponse);
                }
                Err(e) => {
                    if attempt + 1 == attempts {
                        return Err(GenerationError::ExhaustedRetries {
                            attempts,
                            message: e.to_string(),
                        });
                    }
                    let delay = self.policy.backoff(attempt);
                    warn!(attempt, error = %e, delay_ms = delay.as_millis() as u64, "Model call failed, retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
        Err(GenerationError::NoResponse)
    }
}
