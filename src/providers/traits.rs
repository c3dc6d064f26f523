//! Provider trait for classification backends.
//!
//! Backends implement a single capability, [`ClassifyProvider`], so the
//! pipeline is written once and can be exercised against a mock. A backend
//! returns a raw [`Candidate`]; range and label-set guarantees are applied
//! afterwards by [`normalize`](crate::normalize::normalize).
//!
//! # Example
//!
//! ```ignore
//! struct Fixed;
//!
//! #[async_trait]
//! impl ClassifyProvider for Fixed {
//!     fn name(&self) -> &str { "fixed" }
//!
//!     async fn classify(&self, _text: &str, _labels: &[Label]) -> Result<Candidate> {
//!         Ok(Candidate::new("Invoice", 0.9))
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::Result;
use crate::types::{Candidate, Label};

/// Provider for single-label document classification.
#[async_trait]
pub trait ClassifyProvider: Send + Sync {
    /// Provider name for logging/metrics.
    fn name(&self) -> &str;

    /// Pick one of `labels` for `text`.
    ///
    /// Called at most once per request; implementations must not retry.
    async fn classify(&self, text: &str, labels: &[Label]) -> Result<Candidate>;
}

/// Round a zero-shot score to two decimal places.
pub(crate) fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
