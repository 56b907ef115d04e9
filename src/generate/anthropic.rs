//! Anthropic Messages API client.

use super::{TextGenerator, TextRequest};
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Text generator backed by the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

impl AnthropicClient {
    /// Create a client for a model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::config("ANTHROPIC_API_KEY is not set"));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            max_tokens: 1000,
        })
    }

    /// Create a client from service settings.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let mut client = Self::new(config.require_anthropic_key()?, config.model.clone())?;
        client.http = http;
        client.max_tokens = config.max_tokens;
        Ok(client)
    }

    /// Point the client at another endpoint (proxies, local mocks).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The model identifier requests are sent with.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body<'a>(&'a self, request: &'a TextRequest) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: 0.0,
            system: &request.system,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, request: &TextRequest) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Http(describe_error(status.as_u16(), &body)));
        }

        parse_response(&body)
    }
}

/// Concatenate the text blocks of a Messages API response.
fn parse_response(body: &str) -> Result<String> {
    let response: MessagesResponse = serde_json::from_str(body)?;
    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .map(|block| block.text)
        .collect();
    Ok(text)
}

fn describe_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => format!("anthropic {}: {} ({})", status, err.error.message, err.error.kind),
        Err(_) => format!("anthropic {}: {}", status, body.trim()),
    }
}
