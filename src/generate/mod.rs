//! Generation client adapter.
//!
//! The pipeline talks to the generative services through two object-safe
//! traits, [`TextGenerator`] and [`ImageGenerator`]. [`GenerationClient`]
//! wraps them with the per-call timeout, bounded retry and response cleanup
//! every call needs.

mod anthropic;
mod cleanup;
mod images;

pub use anthropic::AnthropicClient;
pub use cleanup::clean_generated_text;
pub use images::OpenAiImageClient;

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// One request to the generative-text service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRequest {
    /// User prompt
    pub prompt: String,
    /// System prompt (persona)
    pub system: String,
    /// Slide the prompt belongs to; `None` for topic generation
    pub slide_index: Option<usize>,
}

impl TextRequest {
    /// Create a request.
    pub fn new(prompt: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: system.into(),
            slide_index: None,
        }
    }

    /// Attach the slide index.
    pub fn for_slide(mut self, index: usize) -> Self {
        self.slide_index = Some(index);
        self
    }
}

/// A generative-text service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one prompt and return the raw answer.
    async fn generate(&self, request: &TextRequest) -> Result<String>;
}

/// A generative-image service.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Produce an image for a prompt and return its encoded bytes.
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>>;
}

/// Timeout and retry settings for generation calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub base_delay: Duration,
    /// Upper bound for a single retry delay
    pub max_delay: Duration,
    /// Per-attempt timeout
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Set the number of retries.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base retry delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay before retry number `retry` (0-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Total attempts, including the first.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Generation front end used by the document builder.
///
/// Cloning is cheap; the underlying services are shared.
#[derive(Clone)]
pub struct GenerationClient {
    text: Arc<dyn TextGenerator>,
    images: Option<Arc<dyn ImageGenerator>>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("images", &self.images.is_some())
            .field("retry", &self.retry)
            .finish()
    }
}

impl GenerationClient {
    /// Create a client around a text service.
    pub fn new(text: Arc<dyn TextGenerator>) -> Self {
        Self {
            text,
            images: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Live client for the configured services.
    ///
    /// The image service is attached only when an OpenAI key is configured.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let text = AnthropicClient::from_config(config)?;
        let mut client = Self::new(Arc::new(text)).with_retry(config.retry_policy());
        if let Some(images) = OpenAiImageClient::from_config(config)? {
            client = client.with_images(Arc::new(images));
        }
        Ok(client)
    }

    /// Enable picture generation.
    pub fn with_images(mut self, images: Arc<dyn ImageGenerator>) -> Self {
        self.images = Some(images);
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The retry policy in use.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Whether an image service is configured.
    pub fn has_images(&self) -> bool {
        self.images.is_some()
    }

    /// Generate text for a request and clean the answer.
    ///
    /// Fails with [`Error::GenerationFailed`] once every attempt failed.
    pub async fn generate_text(&self, request: &TextRequest) -> Result<String> {
        let raw = self
            .retrying(request.slide_index, &request.prompt, || {
                self.text.generate(request)
            })
            .await?;
        Ok(clean_generated_text(&raw))
    }

    /// Generate image bytes for a prompt.
    ///
    /// Fails with a configuration error when no image service is set.
    pub async fn generate_image(&self, slide_index: usize, prompt: &str) -> Result<Vec<u8>> {
        let images = self
            .images
            .as_ref()
            .ok_or_else(|| Error::config("no image service configured"))?;

        self.retrying(Some(slide_index), prompt, || images.generate_image(prompt))
            .await
    }

    async fn retrying<T, F, Fut>(
        &self,
        slide_index: Option<usize>,
        prompt: &str,
        mut call: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.retry.attempts();
        let mut last_error = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(self.retry.backoff(attempt - 1)).await;
            }

            let err = match tokio::time::timeout(self.retry.timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) if err.is_fatal() => return Err(err),
                Ok(Err(err)) => err,
                Err(_) => Error::Http(format!(
                    "request timed out after {}s",
                    self.retry.timeout.as_secs_f64()
                )),
            };

            tracing::warn!(
                slide = ?slide_index,
                attempt = attempt + 1,
                attempts,
                error = %err,
                "generation attempt failed"
            );
            last_error = Some(err);
        }

        Err(match last_error {
            Some(err @ Error::DownloadFailed { .. }) => err,
            Some(err @ Error::GenerationFailed { .. }) => err,
            other => Error::GenerationFailed {
                slide_index,
                prompt: prompt.to_string(),
                reason: other
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no attempt was made".to_string()),
            },
        })
    }
}
