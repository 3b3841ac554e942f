//! Request-time errors and their HTTP mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::error::InferenceError;
use crate::metrics;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error kind.
    #[schema(example = "query_too_long")]
    pub error: String,
    /// Human-readable description.
    pub message: String,
}

/// Errors surfaced by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body is not valid JSON or lacks `query`.
    #[error("{message}")]
    BadRequest {
        /// Status chosen by the JSON extractor (400, 415 or 422).
        status: StatusCode,
        /// Extractor message.
        message: String,
    },

    /// Query exceeds the configured length.
    #[error("query is {len} characters long, the limit is {max}")]
    QueryTooLong {
        /// Submitted length in characters.
        len: usize,
        /// Configured limit.
        max: usize,
    },

    /// Vectorizer or classifier failed.
    #[error("failed to classify query")]
    Inference(#[from] InferenceError),

    /// Classification task panicked or was cancelled.
    #[error("failed to classify query")]
    TaskFailed(#[from] JoinError),
}

impl ApiError {
    /// Machine-readable kind, also used as the error metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "bad_request",
            Self::QueryTooLong { .. } => "query_too_long",
            Self::Inference(_) => "inference_failed",
            Self::TaskFailed(_) => "task_failed",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { status, .. } => *status,
            Self::QueryTooLong { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Inference(_) | Self::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Inference(source) => error!(error = %source, "Detection failed"),
            Self::TaskFailed(source) => error!(error = %source, "Detection task failed"),
            other => warn!(kind = other.kind(), "Rejected detection request"),
        }
        metrics::inc_detection_errors(self.kind());

        let body = ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
