//! OpenAPI document served under `/docs`.

use utoipa::OpenApi;

use super::error::ErrorResponse;
use super::handlers::{self, DetectRequest, DetectResponse, HealthResponse, MessageResponse};

/// OpenAPI description of the service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SQL Injection Detection API",
        version = "1.0",
        description = "Classifies SQL queries as malicious or benign with a pre-trained TF-IDF model."
    ),
    paths(handlers::root, handlers::detect, handlers::health, handlers::metrics_endpoint),
    components(schemas(
        DetectRequest,
        DetectResponse,
        MessageResponse,
        HealthResponse,
        ErrorResponse
    )),
    tags(
        (name = "detection", description = "SQL injection classification"),
        (name = "meta", description = "Service information and health")
    )
)]
pub struct ApiDoc;
