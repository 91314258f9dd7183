//! HTTP surface: `/health`, `/analyze`, `/draft`.
//!
//! Handlers are thin: decode, call the library, map [`TriageError`] to a
//! status code with a `{"detail": ...}` body.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use triage::{
    AnalyzeRequest, DraftComposer, DraftRequest, DraftResponse, ErrorClass, TriageError,
    TriageOutcome, TriageService,
};

// ── App State ──

pub struct AppState {
    pub triage: TriageService,
    pub drafts: DraftComposer,
}

impl AppState {
    pub fn new(triage: TriageService, drafts: DraftComposer) -> Self {
        Self { triage, drafts }
    }
}

// ── Error Handling ──

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

pub fn status_for(class: ErrorClass) -> StatusCode {
    match class {
        ErrorClass::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorClass::ProviderUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorClass::ProviderFailure => StatusCode::BAD_GATEWAY,
    }
}

impl From<TriageError> for ApiError {
    fn from(err: TriageError) -> Self {
        Self {
            status: status_for(err.class()),
            detail: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, detail = %self.detail, "Request failed");
        }
        let body = serde_json::json!({ "detail": self.detail });
        (self.status, Json(body)).into_response()
    }
}

// ── Entrypoint ──

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let app = router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Triage service listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router (for testing without binding to a port).
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/draft", post(draft))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Handlers ──

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    model: String,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let extractor = state.triage.extractor();
    let status = if extractor.is_available().await {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse {
        status,
        model: extractor.model_id().to_string(),
    })
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<TriageOutcome>, ApiError> {
    let Json(request) = body?;
    let outcome = state.triage.analyze(&request).await?;
    Ok(Json(outcome))
}

async fn draft(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DraftRequest>, JsonRejection>,
) -> Result<Json<DraftResponse>, ApiError> {
    let Json(request) = body?;
    let response = state.drafts.compose(&request).await?;
    Ok(Json(response))
}
