//! HTTP-facing error type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::schema::ErrorBody;

/// Everything that can go wrong while serving a request.
///
/// Client mistakes map to 4xx, engine and filesystem failures to 5xx.
/// Nothing is retried.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Cannot read request body: {0}")]
    InvalidBody(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Text extraction failed: {0:#}")]
    Extraction(anyhow::Error),

    #[error("OCR failed: {0:#}")]
    Ocr(anyhow::Error),

    #[error("{0} timed out")]
    Timeout(String),

    #[error("Scratch file error: {0}")]
    Scratch(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidJson(_)
            | AppError::InvalidField { .. }
            | AppError::InvalidBase64(_)
            | AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Extraction(_) | AppError::Ocr(_) | AppError::Scratch(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidJson(_) => "invalid_json",
            AppError::InvalidField { .. } => "invalid_field",
            AppError::InvalidBase64(_) => "invalid_base64",
            AppError::InvalidBody(_) => "invalid_body",
            AppError::PayloadTooLarge => "payload_too_large",
            AppError::Extraction(_) => "extraction_failed",
            AppError::Ocr(_) => "ocr_failed",
            AppError::Timeout(_) => "timeout",
            AppError::Scratch(_) => "scratch_file_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        }

        let body = Json(ErrorBody {
            error: self.kind().to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}
