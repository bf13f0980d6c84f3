//! HTTP surface: `POST /textract` and `GET /status`.

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::AppError;
use crate::gateway::Gateway;
use crate::schema::{ExtractionRequest, ExtractionResponse, StatusResponse};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
}

/// Build the router with body limit, tracing and CORS applied.
pub fn router(state: AppState, config: &GatewayConfig) -> Result<Router> {
    Ok(Router::new()
        .route("/textract", post(textract))
        .route("/status", get(status))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(config.cors.layer()?)
        .with_state(state))
}

/// Liveness probe. No dependency checks.
async fn status() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}

/// Extract text (and optionally word boxes) from a base64 document.
async fn textract(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ExtractionResponse>, AppError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::InvalidBody(rejection.body_text())
        }
    })?;
    let request: ExtractionRequest = serde_json::from_slice(&body)?;

    let span = tracing::info_span!("textract", request_id = %Uuid::new_v4());
    let response = state.gateway.process(request).instrument(span).await?;
    Ok(Json(response))
}
