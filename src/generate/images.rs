//! OpenAI Images API client.

use super::ImageGenerator;
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Image generator backed by the OpenAI Images API.
#[derive(Debug, Clone)]
pub struct OpenAiImageClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    size: String,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    b64_json: Option<String>,
    url: Option<String>,
}

/// Where the bytes of a generated image can be found.
#[derive(Debug, PartialEq, Eq)]
enum ImageSource {
    Inline(Vec<u8>),
    Remote(String),
}

impl OpenAiImageClient {
    /// Create a client.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        size: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::config("OPENAI_API_KEY is not set"));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            size: size.into(),
        })
    }

    /// Create a client from service settings, or `None` when no key is set.
    pub fn from_config(config: &ServiceConfig) -> Result<Option<Self>> {
        let Some(key) = config.openai_api_key.as_deref() else {
            return Ok(None);
        };
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let mut client = Self::new(key, config.image_model.clone(), config.image_size.clone())?;
        client.http = http;
        Ok(Some(client))
    }

    /// Point the client at another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| Error::DownloadFailed {
                url: url.to_string(),
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let body = GenerationRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
        };

        let response = self
            .http
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::Http(format!("openai images {}: {}", status.as_u16(), text.trim())));
        }

        match parse_response(&text)? {
            ImageSource::Inline(bytes) => Ok(bytes),
            ImageSource::Remote(url) => {
                tracing::debug!(%url, "downloading generated image");
                self.download(&url).await
            }
        }
    }
}

fn parse_response(body: &str) -> Result<ImageSource> {
    let response: GenerationResponse = serde_json::from_str(body)?;
    let image = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| Error::Http("image response contained no data".to_string()))?;

    if let Some(encoded) = image.b64_json {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|err| Error::Http(format!("invalid base64 image: {}", err)))?;
        return Ok(ImageSource::Inline(bytes));
    }

    image
        .url
        .map(ImageSource::Remote)
        .ok_or_else(|| Error::Http("image response had neither b64_json nor url".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    #[test]
    fn test_parse_inline_image() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"\x89PNG\r\n\x1a\n");
        let body = format!(r#"{{"created": 1, "data": [{{"b64_json": "{}"}}]}}"#, encoded);
        assert_eq!(
            parse_response(&body).unwrap(),
            ImageSource::Inline(b"\x89PNG\r\n\x1a\n".to_vec())
        );
    }

    #[test]
    fn test_parse_remote_image() {
        let body = r#"{"data": [{"url": "https://cdn.example.com/a.png", "revised_prompt": "x"}]}"#;
        assert_eq!(
            parse_response(body).unwrap(),
            ImageSource::Remote("https://cdn.example.com/a.png".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_empty_responses() {
        assert!(parse_response(r#"{"data": []}"#).is_err());
        assert!(parse_response(r#"{"data": [{}]}"#).is_err());
        assert!(parse_response(r#"{"data": [{"b64_json": "%%%"}]}"#).is_err());
    }

    #[test]
    fn test_from_config_without_key() {
        let config = ServiceConfig::default();
        assert!(OpenAiImageClient::from_config(&config).unwrap().is_none());
        assert!(OpenAiImageClient::new("", "dall-e-3", "1024x1024").is_err());
    }

    /// Serve the router built for a local base URL and return that URL.
    async fn serve(app: impl FnOnce(&str) -> Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let router = app(&base_url);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        base_url
    }

    fn local_client(base_url: &str) -> OpenAiImageClient {
        let mut client = OpenAiImageClient::new("test-key", "dall-e-3", "1024x1024")
            .unwrap()
            .with_base_url(base_url);
        client.http = reqwest::Client::builder().no_proxy().build().unwrap();
        client
    }

    #[tokio::test]
    async fn test_missing_download_reports_status() {
        let base_url = serve(|base_url| {
            let image_url = format!("{}/files/missing.png", base_url);
            Router::new()
                .route(
                    "/v1/images/generations",
                    post(move || {
                        let url = image_url.clone();
                        async move { Json(serde_json::json!({ "data": [{ "url": url }] })) }
                    }),
                )
                .route("/files/missing.png", get(|| async { StatusCode::NOT_FOUND }))
        })
        .await;

        let err = local_client(&base_url)
            .generate_image("a lighthouse")
            .await
            .unwrap_err();
        match err {
            Error::DownloadFailed { url, status } => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/files/missing.png"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_inline_image_from_service() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"\x89PNG\r\n\x1a\n");
        let base_url = serve(|_| {
            Router::new().route(
                "/v1/images/generations",
                post(move || {
                    let encoded = encoded.clone();
                    async move { Json(serde_json::json!({ "data": [{ "b64_json": encoded }] })) }
                }),
            )
        })
        .await;

        let bytes = local_client(&base_url)
            .generate_image("a lighthouse")
            .await
            .unwrap();
        assert_eq!(bytes, b"\x89PNG\r\n\x1a\n".to_vec());
    }

    #[tokio::test]
    async fn test_service_error_is_http_error() {
        let base_url = serve(|_| {
            Router::new().route(
                "/v1/images/generations",
                post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
            )
        })
        .await;

        let err = local_client(&base_url)
            .generate_image("a lighthouse")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(ref message) if message.contains("429")));
    }
}
