//! HTTP error bodies.
//!
//! Every failure is rendered as `{"detail": "..."}`. Pipeline failures get
//! fixed strings per endpoint and the underlying error is only logged.
//! Extractor rejections keep axum's status and message.

use std::borrow::Cow;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::HuginnError;

pub(crate) const TEXT_TOO_SHORT: &str = "Text is too short for classification";
pub(crate) const CLASSIFICATION_ERROR: &str = "Classification error";
pub(crate) const FILE_TOO_SHORT: &str = "File content too short";
pub(crate) const FILE_CLASSIFICATION_ERROR: &str = "File classification error";
pub(crate) const NO_FILE_UPLOADED: &str = "No file uploaded";

/// Which endpoint an error came from; selects the detail wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Text,
    File,
}

/// An error response with a status code and a `detail` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    detail: Cow<'static, str>,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// Map a pipeline error for `endpoint`: input errors are 400, the rest 500.
    pub fn from_pipeline(err: &HuginnError, endpoint: Endpoint) -> Self {
        match (err.is_input_error(), endpoint) {
            (true, Endpoint::Text) => Self::new(StatusCode::BAD_REQUEST, TEXT_TOO_SHORT),
            (true, Endpoint::File) => Self::new(StatusCode::BAD_REQUEST, FILE_TOO_SHORT),
            (false, Endpoint::Text) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, CLASSIFICATION_ERROR)
            }
            (false, Endpoint::File) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, FILE_CLASSIFICATION_ERROR)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
