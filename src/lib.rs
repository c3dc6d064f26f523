//! Huginn - document classification over hosted and local models
//!
//! Free text is sorted into one of a fixed set of document categories
//! ([`Label`]) with a confidence score. Input passes through a
//! [`Pipeline`]: length validation, truncation, a pluggable
//! [`ClassifyProvider`] backend, normalization of the backend's answer and an
//! append-only SQLite audit log ([`LogStore`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use huginn::{LogStore, Pipeline, PipelineConfig};
//! use huginn::providers::GeminiClient;
//!
//! #[tokio::main]
//! async fn main() -> huginn::Result<()> {
//!     let store = LogStore::open("sqlite://classification_logs.db").await?;
//!     store.initialize().await?;
//!
//!     let backend = Arc::new(GeminiClient::new(Some("your-key")));
//!     let pipeline = Pipeline::new(backend, store, PipelineConfig::default())?;
//!
//!     let result = pipeline
//!         .classify("Invoice #123: Payment due for $500 by March 1st.")
//!         .await?;
//!     println!("{} ({})", result.label, result.confidence);
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `google` (default): Gemini backend via the `llm` crate
//! - `huggingface` (default): HuggingFace Inference API zero-shot backend
//! - `local-inference`: ONNX zero-shot backend
//! - `server` (default): axum HTTP service and the `huginnd` binary

pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use error::{HuginnError, Result};
pub use pipeline::{Pipeline, PipelineConfig};
pub use providers::ClassifyProvider;
pub use store::LogStore;
pub use types::{
    Candidate, ClassificationLogEntry, ClassificationRequest, ClassificationResponse, Label,
};
