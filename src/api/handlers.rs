//! HTTP API handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use super::error::{ApiError, ErrorResponse};
use crate::detector::{Detection, Detector};
use crate::metrics;

/// Greeting served on `/`.
pub const WELCOME_MESSAGE: &str =
    "Welcome to the SQL Injection Detection API. Use the /docs endpoint to see documentation.";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded inference context.
    pub detector: Arc<Detector>,
    /// Prometheus render handle.
    pub metrics: PrometheusHandle,
    /// Longest accepted query in characters.
    pub max_query_chars: Option<usize>,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl AppState {
    /// Create new app state with no query limit and a 30s timeout.
    pub fn new(detector: Arc<Detector>, metrics: PrometheusHandle) -> Self {
        Self {
            detector,
            metrics,
            max_query_chars: None,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Set the query length limit.
    pub fn with_max_query_chars(mut self, limit: Option<usize>) -> Self {
        self.max_query_chars = limit;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Body of `POST /detect`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DetectRequest {
    /// Raw query text to classify.
    #[schema(example = "1 OR 1=1 --")]
    pub query: String,
}

/// Classification result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DetectResponse {
    /// The submitted query, unchanged.
    pub query: String,
    /// Predicted class: 1 malicious, 0 benign.
    #[schema(minimum = 0, maximum = 1)]
    pub prediction: u8,
    /// `Malicious` or `Benign`.
    #[schema(example = "Malicious")]
    pub label: String,
}

impl From<Detection> for DetectResponse {
    fn from(detection: Detection) -> Self {
        Self {
            label: detection.label().to_string(),
            prediction: detection.prediction.as_class(),
            query: detection.query,
        }
    }
}

/// Root greeting.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Welcome text.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: String,
}

/// Static greeting.
#[utoipa::path(
    get,
    path = "/",
    tag = "meta",
    responses((status = 200, description = "Welcome message", body = MessageResponse))
)]
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

/// Health check handler - always returns 200 once serving.
#[utoipa::path(
    get,
    path = "/health",
    tag = "meta",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Prometheus exposition.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "meta",
    responses((status = 200, description = "Prometheus text format", body = String, content_type = "text/plain"))
)]
pub async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Classify a query as malicious or benign.
#[utoipa::path(
    post,
    path = "/detect",
    tag = "detection",
    request_body = DetectRequest,
    responses(
        (status = 200, description = "Query classified", body = DetectResponse),
        (status = 400, description = "Body is not valid JSON", body = ErrorResponse),
        (status = 413, description = "Query exceeds the length limit", body = ErrorResponse),
        (status = 422, description = "Body lacks a string `query`", body = ErrorResponse),
        (status = 500, description = "Classification failed", body = ErrorResponse)
    )
)]
pub async fn detect(
    State(state): State<AppState>,
    payload: Result<Json<DetectRequest>, JsonRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    let Json(request) = payload?;

    if let Some(max) = state.max_query_chars {
        let len = request.query.chars().count();
        if len > max {
            return Err(ApiError::QueryTooLong { len, max });
        }
    }

    // CPU-bound; must not run on an async worker.
    let detector = Arc::clone(&state.detector);
    let detection = {
        let _timer = metrics::timer_detection();
        tokio::task::spawn_blocking(move || detector.classify(&request.query)).await??
    };
    metrics::inc_detections(detection.prediction);
    debug!(label = detection.label(), "Query classified");

    Ok(Json(detection.into()))
}
