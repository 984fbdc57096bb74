//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for question answering, retrieval, and a health
//! surface reporting whether a corpus snapshot is loaded.

use super::load_engine;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::LectioError;
use crate::query::{QueryEngine, SourceChunk};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Shared application state.
struct AppState {
    /// None when no corpus snapshot exists yet.
    engine: Option<QueryEngine>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let engine = match load_engine(&settings, None, None) {
        Ok(engine) => Some(engine),
        Err(LectioError::CorpusNotLoaded(msg)) => {
            warn!("Starting without a corpus: {}", msg);
            Output::warning(&format!("No corpus loaded ({}); /ask will return 503.", msg));
            None
        }
        Err(e) => return Err(e.into()),
    };

    let state = Arc::new(AppState { engine });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/ask", post(ask))
        .route("/search", post(search))
        .route("/videos", get(list_videos))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Lectio API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ask (RAG)", "POST /ask");
    Output::kv("Search", "POST /search");
    Output::kv("List Videos", "GET  /videos");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    corpus_loaded: bool,
    chunk_count: usize,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    fallback: bool,
    sources: Vec<SourceChunk>,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    5
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SourceChunk>,
}

#[derive(Serialize)]
struct VideoListResponse {
    videos: Vec<VideoInfo>,
    total_chunks: usize,
}

#[derive(Serialize)]
struct VideoInfo {
    video_title: String,
    chunk_count: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_status(e: &LectioError) -> StatusCode {
    match e {
        LectioError::EmptyQuery => StatusCode::BAD_REQUEST,
        LectioError::CorpusNotLoaded(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn no_corpus() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: "No corpus snapshot loaded. Run 'lectio ingest' first.".to_string(),
        }),
    )
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let chunk_count = state
        .engine
        .as_ref()
        .map(|e| e.index().corpus().len())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "ok",
        corpus_loaded: state.engine.is_some(),
        chunk_count,
    })
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    let Some(engine) = &state.engine else {
        return no_corpus().into_response();
    };

    match engine.answer(&req.question).await {
        Ok(response) => Json(AskResponse {
            answer: response.answer,
            fallback: response.fallback,
            sources: response.sources,
        })
        .into_response(),
        Err(e) => (
            error_status(&e),
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    let Some(engine) = &state.engine else {
        return no_corpus().into_response();
    };

    match engine.search(&req.query, req.limit).await {
        Ok(results) => Json(SearchResponse { results }).into_response(),
        Err(e) => (
            error_status(&e),
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn list_videos(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Some(engine) = &state.engine else {
        return no_corpus().into_response();
    };

    let corpus = engine.index().corpus();
    Json(VideoListResponse {
        videos: corpus
            .video_summary()
            .into_iter()
            .map(|(video_title, chunk_count)| VideoInfo {
                video_title,
                chunk_count,
            })
            .collect(),
        total_chunks: corpus.len(),
    })
    .into_response()
}
