// src/handler.rs

//! HTTP ingestion endpoints.
//!
//! Two POST endpoints, one per source, both speaking the same contract: a
//! `{from, to, location?, cpv?}` request and a `{results}` envelope on
//! success or `{error}` with a 4xx/5xx status on failure. The envelope shape
//! is what the dashboard's fetch client and the external snapshot process
//! expect.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::error::{AppError, Result};
use crate::models::{Config, Notice, SearchPayload, SourceKind};
use crate::pipeline::run_aggregation;

/// Shared state for the ingestion endpoints.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ResultsEnvelope {
    pub results: Vec<Notice>,
}

/// Failure envelope.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

/// Build the application router.
pub fn create_router(config: Arc<Config>) -> Router {
    let state = AppState { config };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/doffin/search", post(search_api_source))
        .route("/api/listing/search", post(search_browser_source))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Bind and serve the router until the process stops.
pub async fn serve(config: Arc<Config>) -> Result<()> {
    let addr = config.server.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on {addr}");
    axum::serve(listener, create_router(config)).await?;
    Ok(())
}

async fn search_api_source(
    State(state): State<AppState>,
    Json(payload): Json<SearchPayload>,
) -> Response {
    ingest(state, SourceKind::Api, payload).await
}

async fn search_browser_source(
    State(state): State<AppState>,
    Json(payload): Json<SearchPayload>,
) -> Response {
    ingest(state, SourceKind::Browser, payload).await
}

async fn ingest(state: AppState, source: SourceKind, payload: SearchPayload) -> Response {
    let outcome = match payload.into_request() {
        Ok(request) => run_aggregation(&state.config, source, &request).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(results) => (StatusCode::OK, Json(ResultsEnvelope { results })).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: AppError) -> Response {
    let status = match &error {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::Upstream { .. } | AppError::Browser(_) | AppError::Http(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    log::error!("ingestion failed: {error}");
    (
        status,
        Json(ErrorEnvelope {
            error: error.to_string(),
        }),
    )
        .into_response()
}
