//! HTTP surface.
//!
//! | Method | Path             | Body                          |
//! |--------|------------------|-------------------------------|
//! | GET    | `/health`        | none                          |
//! | POST   | `/classify`      | `{"text": "..."}`             |
//! | POST   | `/classify/file` | multipart form, field `file`  |
//!
//! Cross-origin requests are allowed from any origin. Request bodies are
//! not size-limited; oversized text is truncated by the pipeline.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Pipeline;

pub use error::ApiError;

/// Build the application router around a shared pipeline.
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/classify", post(routes::classify_text))
        .route("/classify/file", post(routes::classify_file))
        .layer(DefaultBodyLimit::disable())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}
