//! Telemetry metric name constants.
//!
//! Centralised metric names for huginn operations. Deployments install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `huginn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `backend`: classification provider name (e.g. "gemini", "huggingface")
//! - `status`: outcome: "ok" or "error"

/// Classifications that reached the backend.
///
/// Labels: `backend`, `status` ("ok" | "error").
pub const CLASSIFICATIONS_TOTAL: &str = "huginn_classifications_total";

/// Backend call plus normalization duration in seconds.
///
/// Labels: `backend`.
pub const CLASSIFICATION_DURATION_SECONDS: &str = "huginn_classification_duration_seconds";

/// Inputs clipped to the configured maximum length.
pub const TRUNCATIONS_TOTAL: &str = "huginn_truncations_total";

/// Requests rejected before the backend call (input too short).
pub const REJECTIONS_TOTAL: &str = "huginn_rejections_total";

/// Audit-log writes that failed and were swallowed.
pub const LOG_WRITE_FAILURES_TOTAL: &str = "huginn_log_write_failures_total";
