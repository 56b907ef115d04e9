//! HTTP trigger: every request builds its own deck.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use slidegen::pptx::PptxWriter;
use slidegen::{resolve_topic, DeckOptions, DocumentBuilder, Error, GenerationClient};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Shared, read-only server state.
#[derive(Clone)]
pub struct Server {
    inner: Arc<Shared>,
}

struct Shared {
    /// A client, or the configuration error that prevented building one
    client: Result<GenerationClient, String>,
    options: DeckOptions,
    out_dir: PathBuf,
    written: AtomicU64,
}

#[derive(Debug, Deserialize)]
pub struct GenerateParams {
    topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    message: String,
    path: String,
    topic: String,
    title: Option<String>,
    slides: usize,
}

/// Error body returned with a non-success status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match err {
            Error::Configuration(_) => StatusCode::BAD_REQUEST,
            Error::GenerationFailed { .. } | Error::DownloadFailed { .. } | Error::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl Server {
    pub fn new(
        client: Result<GenerationClient, String>,
        options: DeckOptions,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            inner: Arc::new(Shared {
                client,
                options,
                out_dir: out_dir.into(),
                written: AtomicU64::new(0),
            }),
        }
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/generate_ppt", get(generate_ppt))
            .with_state(self)
    }

    /// Unique artifact path for the next deck.
    fn next_path(&self) -> PathBuf {
        let n = self.inner.written.fetch_add(1, Ordering::Relaxed) + 1;
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.inner
            .out_dir
            .join(format!("presentation-{}-{}.pptx", secs, n))
    }
}

/// Bind and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, server: Server) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, server.router())
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

async fn index() -> &'static str {
    "Welcome to the presentation generator"
}

async fn generate_ppt(
    State(server): State<Server>,
    Query(params): Query<GenerateParams>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let shared = &server.inner;
    let client = shared.client.as_ref().map_err(|message| ApiError {
        status: StatusCode::BAD_REQUEST,
        message: message.clone(),
    })?;

    let topic = resolve_topic(client, params.topic.as_deref())
        .await
        .inspect_err(|err| warn!(error = %err, "topic unavailable"))?;

    let builder = DocumentBuilder::new(client.clone(), shared.options.clone());
    let document = builder.build(&topic).await?;

    let bytes = PptxWriter::new().write_to_vec(&document)?;
    let path = server.next_path();
    tokio::fs::write(&path, bytes).await.map_err(Error::from)?;
    info!(topic = %topic, path = %path.display(), "presentation written");

    Ok(Json(GenerateResponse {
        message: "Presentation generated successfully".to_string(),
        path: path.display().to_string(),
        topic: topic.to_string(),
        title: document.metadata().title.clone(),
        slides: document.len(),
    }))
}
