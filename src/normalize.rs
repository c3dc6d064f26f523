//! Response normalization.
//!
//! Turns a backend [`Candidate`] into a [`ClassificationResponse`] that is
//! guaranteed to carry a label from the active set and a confidence in
//! `[0, 1]`. Out-of-range confidences are clamped; unknown labels are a hard
//! failure because they mean the backend broke its output contract.

use crate::types::{Candidate, ClassificationResponse, Label};
use crate::{HuginnError, Result};

/// Validate and clamp a backend candidate against `labels`.
pub fn normalize(candidate: Candidate, labels: &[Label]) -> Result<ClassificationResponse> {
    let label = resolve_label(&candidate.label, labels)?;
    let confidence = clamp_confidence(candidate.confidence)?;
    Ok(ClassificationResponse { label, confidence })
}

/// Resolve a label name against the active label set.
pub fn resolve_label(name: &str, labels: &[Label]) -> Result<Label> {
    let label: Label = name.parse()?;
    if labels.contains(&label) {
        Ok(label)
    } else {
        Err(HuginnError::InvalidCategory(name.to_string()))
    }
}

/// Clamp a confidence into `[0, 1]`. NaN has no sensible clamp and is rejected.
pub fn clamp_confidence(confidence: f64) -> Result<f64> {
    if confidence.is_nan() {
        return Err(HuginnError::InvalidResponseFormat(
            "confidence is not a number".to_string(),
        ));
    }
    Ok(confidence.clamp(0.0, 1.0))
}
