//! HTTP API: classification endpoint, greeting, health, metrics and docs.

pub mod docs;
pub mod error;
pub mod handlers;
pub mod routes;

pub use docs::ApiDoc;
pub use error::{ApiError, ErrorResponse};
pub use handlers::{AppState, DetectRequest, DetectResponse};
pub use routes::create_router;
