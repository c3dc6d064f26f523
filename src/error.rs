//! Huginn error types

use std::time::Duration;

/// Huginn error types
#[derive(Debug, thiserror::Error)]
pub enum HuginnError {
    // Input errors
    #[error("input too short: at least {min} characters required, got {len}")]
    TextTooShort { min: usize, len: usize },

    #[error("input is not valid UTF-8 text: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("no API key configured for {0}")]
    MissingApiKey(&'static str),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    // Backend contract violations
    #[error("invalid response format: {0}")]
    InvalidResponseFormat(String),

    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("empty response from model")]
    EmptyResponse,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Local inference errors
    #[error("data error: {0}")]
    DataError(String),

    // Storage errors
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Anything that went wrong after the input passed validation.
    ///
    /// The pipeline collapses backend, normalization and decode failures into
    /// this variant so callers see a single opaque failure.
    #[error("classification error")]
    ClassificationFailed(#[source] Box<HuginnError>),

    // Wrapped llm crate error
    #[error("LLM error: {0}")]
    Llm(String),
}

impl HuginnError {
    /// Whether the error was raised before the backend was called.
    pub fn is_input_error(&self) -> bool {
        matches!(self, HuginnError::TextTooShort { .. })
    }

    /// Wrap into [`HuginnError::ClassificationFailed`] unless already wrapped.
    pub fn into_classification_failure(self) -> Self {
        match self {
            HuginnError::ClassificationFailed(_) => self,
            other => HuginnError::ClassificationFailed(Box::new(other)),
        }
    }
}

#[cfg(feature = "google")]
impl From<llm::error::LLMError> for HuginnError {
    fn from(err: llm::error::LLMError) -> Self {
        let msg = err.to_string();
        if msg.contains("rate limit") || msg.contains("429") {
            HuginnError::RateLimited { retry_after: None }
        } else if msg.contains("authentication")
            || msg.contains("401")
            || msg.contains("invalid api key")
            || msg.contains("API key not valid")
        {
            HuginnError::AuthenticationFailed
        } else if msg.contains("not found") || msg.contains("404") {
            HuginnError::ModelNotFound(msg)
        } else {
            HuginnError::Llm(msg)
        }
    }
}

/// Result type alias for Huginn operations
pub type Result<T> = std::result::Result<T, HuginnError>;
