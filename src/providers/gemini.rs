//! Hosted generative-model backend (Google Gemini).
//!
//! The model is asked to answer with a JSON object carrying `label` and
//! `confidence`. Gemini tends to wrap that object in a markdown code fence,
//! so the reply is unwrapped before decoding. That quirk stays in this
//! module; nothing downstream sees fenced text.
//!
//! Prompt construction and reply parsing are always compiled. The client
//! itself needs the `google` feature.

use serde_json::Value;

use crate::normalize::{clamp_confidence, resolve_label};
use crate::types::{Candidate, Label};
use crate::{HuginnError, Result};

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Build the classification prompt. `text` is embedded verbatim.
pub fn build_prompt(text: &str, labels: &[Label]) -> String {
    format!(
        "Classify the following document into one of the categories: {}.\n\
         Return a JSON with \"label\" and \"confidence\" between 0 and 1.\n\
         \n\
         Text: \"{}\"\n\
         \n\
         JSON only:",
        Label::join(labels),
        text
    )
}

/// Remove a markdown code fence around the reply, if there is one.
///
/// A ```` ```json ```` fence wins over a bare ```` ``` ```` fence. Without
/// any fence the trimmed reply is returned unchanged.
pub fn strip_code_fence(reply: &str) -> &str {
    let reply = reply.trim();
    let body = if let Some((_, rest)) = reply.split_once("```json") {
        rest
    } else if let Some((_, rest)) = reply.split_once("```") {
        rest
    } else {
        return reply;
    };
    body.split_once("```").map_or(body, |(inner, _)| inner).trim()
}

/// Decode a model reply into a candidate from `labels`.
///
/// Fails with [`HuginnError::InvalidResponseFormat`] when either field is
/// missing or mistyped and with [`HuginnError::InvalidCategory`] when the
/// label is outside `labels`. Confidence is clamped into `[0, 1]`.
pub fn parse_reply(reply: &str, labels: &[Label]) -> Result<Candidate> {
    let value: Value = serde_json::from_str(strip_code_fence(reply))?;

    let (Some(label), Some(confidence)) = (value.get("label"), value.get("confidence")) else {
        return Err(HuginnError::InvalidResponseFormat(
            "reply must contain \"label\" and \"confidence\"".to_string(),
        ));
    };
    let label = label.as_str().ok_or_else(|| {
        HuginnError::InvalidResponseFormat(format!("label is not a string: {label}"))
    })?;
    let confidence = confidence.as_f64().ok_or_else(|| {
        HuginnError::InvalidResponseFormat(format!("confidence is not a number: {confidence}"))
    })?;

    let label = resolve_label(label, labels)?;
    let confidence = clamp_confidence(confidence)?;
    Ok(Candidate::new(label.as_str(), confidence))
}

#[cfg(feature = "google")]
pub use client::GeminiClient;

#[cfg(feature = "google")]
mod client {
    use async_trait::async_trait;
    use llm::LLMProvider;
    use llm::builder::{LLMBackend, LLMBuilder};
    use llm::chat::ChatMessage;
    use tracing::{debug, instrument};

    use super::{DEFAULT_MODEL, build_prompt, parse_reply};
    use crate::providers::traits::ClassifyProvider;
    use crate::types::{Candidate, Label};
    use crate::{HuginnError, Result};

    /// Gemini client implementing [`ClassifyProvider`].
    ///
    /// A missing API key does not prevent construction; every call then
    /// fails with [`HuginnError::MissingApiKey`].
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = GeminiClient::new(Some("your-key")).model("gemini-2.0-flash");
    /// ```
    #[derive(Debug, Clone)]
    pub struct GeminiClient {
        api_key: Option<String>,
        model: String,
    }

    impl GeminiClient {
        pub fn new(api_key: Option<impl Into<String>>) -> Self {
            Self {
                api_key: api_key.map(Into::into),
                model: DEFAULT_MODEL.to_string(),
            }
        }

        /// Override the model name.
        pub fn model(mut self, model: impl Into<String>) -> Self {
            self.model = model.into();
            self
        }

        fn build_provider(&self) -> Result<Box<dyn LLMProvider>> {
            let key = self
                .api_key
                .as_ref()
                .ok_or(HuginnError::MissingApiKey("gemini"))?;

            LLMBuilder::new()
                .backend(LLMBackend::Google)
                .model(&self.model)
                .api_key(key)
                .build()
                .map_err(|e| HuginnError::Llm(e.to_string()))
        }
    }

    #[async_trait]
    impl ClassifyProvider for GeminiClient {
        fn name(&self) -> &str {
            "gemini"
        }

        #[instrument(name = "gemini.classify", skip(self, text, labels), fields(model = %self.model))]
        async fn classify(&self, text: &str, labels: &[Label]) -> Result<Candidate> {
            let provider = self.build_provider()?;
            let messages = vec![
                ChatMessage::user()
                    .content(build_prompt(text, labels))
                    .build(),
            ];

            let response = provider.chat(&messages).await?;
            let reply = response
                .text()
                .filter(|t| !t.trim().is_empty())
                .ok_or(HuginnError::EmptyResponse)?;
            debug!(reply = %reply, "gemini reply");

            parse_reply(&reply, labels)
        }
    }
}
