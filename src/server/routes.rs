//! Request handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde_json::{Value, json};
use tracing::{error, info};

use super::error::{ApiError, Endpoint, FILE_CLASSIFICATION_ERROR, NO_FILE_UPLOADED};
use crate::Pipeline;
use crate::types::{ClassificationRequest, ClassificationResponse};

/// Multipart field carrying the uploaded document.
pub(crate) const FILE_FIELD: &str = "file";

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn classify_text(
    State(pipeline): State<Arc<Pipeline>>,
    request: Result<Json<ClassificationRequest>, JsonRejection>,
) -> Result<Json<ClassificationResponse>, ApiError> {
    let Json(request) = request?;
    pipeline
        .classify(&request.text)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_pipeline(&e, Endpoint::Text))
}

pub async fn classify_file(
    State(pipeline): State<Arc<Pipeline>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ClassificationResponse>, ApiError> {
    let mut multipart = multipart?;
    let bytes = read_file_field(&mut multipart).await?;
    info!(bytes = bytes.len(), "received file upload");

    pipeline
        .classify_bytes(bytes)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_pipeline(&e, Endpoint::File))
}

/// Pull the `file` field out of the form, skipping any others.
async fn read_file_field(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    let upload_failed = |e: axum::extract::multipart::MultipartError| {
        error!(error = %e, "failed to read multipart upload");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, FILE_CLASSIFICATION_ERROR)
    };

    while let Some(field) = multipart.next_field().await.map_err(upload_failed)? {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field.bytes().await.map_err(upload_failed)?;
            return Ok(bytes.to_vec());
        }
    }

    Err(ApiError::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        NO_FILE_UPLOADED,
    ))
}
