//! Request pipeline: validate → truncate → classify → normalize → log.
//!
//! ```text
//! raw text ──trim──► length check ──► truncate ──► backend.classify
//!                        │ too short                     │
//!                        ▼                               ▼
//!                  TextTooShort                 normalize ──► store.append ──► response
//! ```
//!
//! Only the length check is reported to the caller as such. Every failure
//! from the backend call onwards becomes [`HuginnError::ClassificationFailed`].

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, instrument};

use crate::normalize::normalize;
use crate::providers::ClassifyProvider;
use crate::store::LogStore;
use crate::telemetry;
use crate::types::{ClassificationResponse, Label};
use crate::{HuginnError, Result};

/// Minimum trimmed input length, in characters.
pub const DEFAULT_MIN_LENGTH: usize = 10;

/// Maximum number of characters sent to a backend.
pub const DEFAULT_MAX_LENGTH: usize = 2000;

/// Pipeline limits and the active label set.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub min_length: usize,
    pub max_length: usize,
    pub labels: Vec<Label>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            labels: Label::ALL.to_vec(),
        }
    }
}

impl PipelineConfig {
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = min;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = max;
        self
    }

    pub fn labels(mut self, labels: impl Into<Vec<Label>>) -> Self {
        self.labels = labels.into();
        self
    }

    /// Reject limits that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        if self.labels.is_empty() {
            return Err(HuginnError::Configuration(
                "label set must not be empty".to_string(),
            ));
        }
        if self.max_length == 0 {
            return Err(HuginnError::Configuration(
                "max_length must be positive".to_string(),
            ));
        }
        if self.min_length > self.max_length {
            return Err(HuginnError::Configuration(format!(
                "min_length ({}) exceeds max_length ({})",
                self.min_length, self.max_length
            )));
        }
        Ok(())
    }
}

/// The classification pipeline. Immutable and shareable across requests.
pub struct Pipeline {
    backend: Arc<dyn ClassifyProvider>,
    store: LogStore,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        backend: Arc<dyn ClassifyProvider>,
        store: LogStore,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            store,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Classify raw input text.
    #[instrument(skip(self, raw), fields(backend = %self.backend.name()))]
    pub async fn classify(&self, raw: &str) -> Result<ClassificationResponse> {
        let text = raw.trim();
        let len = text.chars().count();

        if len < self.config.min_length {
            metrics::counter!(telemetry::REJECTIONS_TOTAL).increment(1);
            return Err(HuginnError::TextTooShort {
                min: self.config.min_length,
                len,
            });
        }

        let text = self.truncate(text, len);
        let sent = len.min(self.config.max_length);

        let start = Instant::now();
        let result = self.classify_validated(&text, sent).await;
        self.record(start, result.is_ok());

        result.map_err(|e| {
            error!(error = %e, "Classification error");
            e.into_classification_failure()
        })
    }

    /// Decode uploaded bytes as UTF-8, then classify.
    pub async fn classify_bytes(&self, bytes: Vec<u8>) -> Result<ClassificationResponse> {
        let text = String::from_utf8(bytes).map_err(|e| {
            error!(error = %e, "Uploaded content is not valid UTF-8");
            HuginnError::from(e).into_classification_failure()
        })?;
        self.classify(&text).await
    }

    fn truncate<'a>(&self, text: &'a str, len: usize) -> Cow<'a, str> {
        let max = self.config.max_length;
        if len <= max {
            return Cow::Borrowed(text);
        }
        info!("Truncating text from {} to {} characters", len, max);
        metrics::counter!(telemetry::TRUNCATIONS_TOTAL).increment(1);
        Cow::Owned(text.chars().take(max).collect())
    }

    async fn classify_validated(&self, text: &str, sent: usize) -> Result<ClassificationResponse> {
        let labels = &self.config.labels;
        let candidate = self.backend.classify(text, labels).await?;
        let response = normalize(candidate, labels)?;
        self.store
            .append(sent, response.label, response.confidence)
            .await;
        Ok(response)
    }

    fn record(&self, start: Instant, ok: bool) {
        let backend = self.backend.name().to_owned();
        let status = if ok { "ok" } else { "error" };
        metrics::counter!(telemetry::CLASSIFICATIONS_TOTAL,
            "backend" => backend.clone(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::CLASSIFICATION_DURATION_SECONDS,
            "backend" => backend,
        )
        .record(start.elapsed().as_secs_f64());
    }
}
