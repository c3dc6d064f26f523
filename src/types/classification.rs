//! Request, response and audit-log types.

use serde::{Deserialize, Serialize};

use super::label::Label;

/// Body of `POST /classify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub text: String,
}

/// A validated classification: label from the active set, confidence in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    pub label: Label,
    pub confidence: f64,
}

/// Raw backend output, before normalization.
///
/// Backends are trusted to produce a string label and a number, nothing more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub label: String,
    pub confidence: f64,
}

impl Candidate {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// One row of the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClassificationLogEntry {
    pub id: i64,
    /// RFC 3339 timestamp (UTC) of when the row was written.
    pub timestamp: String,
    pub text_length: i64,
    pub label: String,
    pub confidence: f64,
}
