//! Classification backends.
//!
//! - [`gemini`]: hosted generative model, answers in JSON (`google` feature)
//! - [`huggingface`]: hosted zero-shot classifier (`huggingface` feature)
//! - [`local`]: local NLI cross-encoder (`local-inference` feature)

pub mod gemini;
#[cfg(feature = "huggingface")]
pub mod huggingface;
pub mod local;
pub mod traits;

#[cfg(feature = "google")]
pub use gemini::GeminiClient;
#[cfg(feature = "huggingface")]
pub use huggingface::HuggingFaceClient;
#[cfg(feature = "local-inference")]
pub use local::{Device, LocalNliModel, LocalZeroShotProvider, OnnxZeroShot};
pub use traits::ClassifyProvider;
