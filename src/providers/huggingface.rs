//! HuggingFace Inference API client for zero-shot classification.
//!
//! This client uses HuggingFace's serverless inference endpoints.
//! See: <https://huggingface.co/docs/api-inference/index>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::traits::{ClassifyProvider, round_score};
use crate::types::{Candidate, Label};
use crate::{HuginnError, Result};

/// Default base URL for HuggingFace Inference API
const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Default zero-shot model.
pub const DEFAULT_MODEL: &str = "facebook/bart-large-mnli";

/// Client for HuggingFace zero-shot classification.
///
/// The top-ranked candidate label is returned with its score rounded to two
/// decimal places. Only the supplied labels are offered to the model, so the
/// result is always a member of the set.
#[derive(Clone)]
pub struct HuggingFaceClient {
    api_key: Option<String>,
    http: Client,
    base_url: String,
    model: String,
}

impl HuggingFaceClient {
    /// Create a new HuggingFace client with the given API key.
    pub fn new(api_key: Option<impl Into<String>>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: Option<impl Into<String>>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.map(Into::into),
            http: Client::new(),
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the model ID (e.g. `MoritzLaurer/deberta-v3-base-zeroshot-v2.0`).
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Perform zero-shot classification and return the top label.
    ///
    /// # Arguments
    /// * `text` - Text to classify
    /// * `labels` - Candidate labels
    #[instrument(name = "huggingface.classify", skip(self, text, labels), fields(model = %self.model))]
    pub async fn classify(&self, text: &str, labels: &[Label]) -> Result<Candidate> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(HuginnError::MissingApiKey("huggingface"))?;
        let url = format!("{}/models/{}", self.base_url, self.model);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&ZeroShotRequest {
                inputs: text,
                parameters: ZeroShotParameters {
                    candidate_labels: labels.iter().map(Label::as_str).collect(),
                },
            })
            .send()
            .await
            .map_err(|e| HuginnError::Http(e.to_string()))?;

        self.handle_response_errors(&response)?;

        let result: ZeroShotResponse = response
            .json()
            .await
            .map_err(|e| HuginnError::Http(e.to_string()))?;

        let (top_label, score) = result
            .labels
            .into_iter()
            .zip(result.scores)
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or(HuginnError::EmptyResponse)?;

        Ok(Candidate::new(top_label, round_score(score)))
    }

    /// Check response status and map to appropriate error.
    fn handle_response_errors(&self, response: &reqwest::Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        match status.as_u16() {
            401 => Err(HuginnError::AuthenticationFailed),
            404 => Err(HuginnError::ModelNotFound(self.model.clone())),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(HuginnError::RateLimited { retry_after })
            }
            503 => Err(HuginnError::Api {
                status: 503,
                message: "Model is loading".to_string(),
            }),
            code => Err(HuginnError::Api {
                status: code,
                message: format!("HuggingFace API error: {}", status),
            }),
        }
    }
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: Vec<&'a str>,
}

#[derive(Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

#[async_trait]
impl ClassifyProvider for HuggingFaceClient {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn classify(&self, text: &str, labels: &[Label]) -> Result<Candidate> {
        HuggingFaceClient::classify(self, text, labels).await
    }
}
