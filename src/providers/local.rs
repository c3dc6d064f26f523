//! Local zero-shot classification via an NLI cross-encoder.
//!
//! Each candidate label is turned into a hypothesis ("This example is
//! Invoice.") and scored against the text as premise. The entailment logits
//! are softmaxed across labels and the best label wins, so the result is
//! always drawn from the supplied set.
//!
//! Scoring math is always compiled; the ONNX Runtime session needs the
//! `local-inference` feature.

use crate::types::{Candidate, Label};
use crate::{HuginnError, Result};

use super::traits::round_score;

/// Hypothesis used for each candidate label.
pub fn hypothesis(label: Label) -> String {
    format!("This example is {}.", label)
}

/// Softmax function.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|x| x / sum).collect()
}

/// Pick the best label from per-label entailment logits.
///
/// Ties go to the label listed first.
pub fn top_candidate(labels: &[Label], entailment_logits: &[f32]) -> Result<Candidate> {
    if labels.is_empty() || labels.len() != entailment_logits.len() {
        return Err(HuginnError::DataError(format!(
            "expected {} label scores, got {}",
            labels.len(),
            entailment_logits.len()
        )));
    }

    let probs = softmax(entailment_logits);
    let (best, prob) = probs
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(bi, bp), (i, &p)| {
            if p > bp { (i, p) } else { (bi, bp) }
        });

    Ok(Candidate::new(labels[best].as_str(), round_score(f64::from(prob))))
}

#[cfg(feature = "local-inference")]
pub use onnx::{Device, LocalNliModel, LocalZeroShotProvider, OnnxZeroShot};

#[cfg(feature = "local-inference")]
mod onnx {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use ort::session::Session;
    use ort::session::builder::GraphOptimizationLevel;
    use ort::value::TensorRef;
    use tracing::{info, instrument};

    use super::{hypothesis, top_candidate};
    use crate::providers::traits::ClassifyProvider;
    use crate::types::{Candidate, Label};
    use crate::{HuginnError, Result};

    /// Cross-encoder NLI models order logits as contradiction, entailment, neutral.
    const ENTAILMENT_INDEX: usize = 1;

    /// Compute device for local inference.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum Device {
        #[default]
        Cpu,
        #[cfg(feature = "cuda")]
        Cuda { device_id: u32 },
    }

    impl Device {
        /// Parse the config spelling ("cpu", "cuda", "cuda:1").
        pub fn parse(s: &str) -> Result<Self> {
            match s {
                "cpu" => Ok(Self::Cpu),
                #[cfg(feature = "cuda")]
                "cuda" => Ok(Self::Cuda { device_id: 0 }),
                #[cfg(feature = "cuda")]
                other if other.starts_with("cuda:") => other[5..]
                    .parse()
                    .map(|device_id| Self::Cuda { device_id })
                    .map_err(|_| HuginnError::Configuration(format!("invalid device: {other}"))),
                other => Err(HuginnError::Configuration(format!(
                    "unsupported device: {other}"
                ))),
            }
        }
    }

    /// Supported local NLI models.
    #[derive(Debug, Clone, Default)]
    pub enum LocalNliModel {
        /// cross-encoder/nli-deberta-v3-base
        NliDebertaV3Base,
        /// cross-encoder/nli-deberta-v3-small
        #[default]
        NliDebertaV3Small,
        /// Model and tokenizer already on disk.
        Custom {
            model_path: PathBuf,
            tokenizer_path: PathBuf,
        },
    }

    impl LocalNliModel {
        /// Map a config model name onto a known model.
        pub fn from_name(name: &str) -> Result<Self> {
            match name {
                "cross-encoder/nli-deberta-v3-base" | "nli-deberta-v3-base" => {
                    Ok(Self::NliDebertaV3Base)
                }
                "cross-encoder/nli-deberta-v3-small" | "nli-deberta-v3-small" => {
                    Ok(Self::NliDebertaV3Small)
                }
                other => Err(HuginnError::Configuration(format!(
                    "unknown local model: {other}"
                ))),
            }
        }

        pub fn repo_id(&self) -> Option<&'static str> {
            match self {
                Self::NliDebertaV3Base => Some("cross-encoder/nli-deberta-v3-base"),
                Self::NliDebertaV3Small => Some("cross-encoder/nli-deberta-v3-small"),
                Self::Custom { .. } => None,
            }
        }

        fn resolve_paths(&self, cache_dir: Option<&Path>) -> Result<(PathBuf, PathBuf)> {
            match self {
                Self::Custom {
                    model_path,
                    tokenizer_path,
                } => Ok((model_path.clone(), tokenizer_path.clone())),
                Self::NliDebertaV3Base => {
                    download_model("cross-encoder/nli-deberta-v3-base", cache_dir)
                }
                Self::NliDebertaV3Small => {
                    download_model("cross-encoder/nli-deberta-v3-small", cache_dir)
                }
            }
        }
    }

    /// ONNX session plus tokenizer for one NLI cross-encoder.
    pub struct OnnxZeroShot {
        session: Session,
        tokenizer: tokenizers::Tokenizer,
    }

    impl OnnxZeroShot {
        /// Load the model, downloading it into `cache_dir` (or the hf-hub default) if needed.
        pub fn load(model: &LocalNliModel, device: Device, cache_dir: Option<&Path>) -> Result<Self> {
            let (model_path, tokenizer_path) = model.resolve_paths(cache_dir)?;
            info!(model = %model_path.display(), ?device, "loading local NLI model");

            let session = build_session(&model_path, device)?;
            let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
                HuginnError::Configuration(format!("Failed to load tokenizer: {}", e))
            })?;

            Ok(Self { session, tokenizer })
        }

        /// Classify `text` against `labels`.
        pub fn classify(&mut self, text: &str, labels: &[Label]) -> Result<Candidate> {
            let mut entailment = Vec::with_capacity(labels.len());
            for &label in labels {
                let logits = self.pair_logits(text, &hypothesis(label))?;
                let score = logits.get(ENTAILMENT_INDEX).copied().ok_or_else(|| {
                    HuginnError::DataError(format!("Expected 3 logits, got {}", logits.len()))
                })?;
                entailment.push(score);
            }
            top_candidate(labels, &entailment)
        }

        fn pair_logits(&mut self, premise: &str, hypothesis: &str) -> Result<Vec<f32>> {
            let encoding = self
                .tokenizer
                .encode((premise, hypothesis), true)
                .map_err(|e| HuginnError::DataError(format!("Tokenization failed: {}", e)))?;

            let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
            let attention_mask: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect();
            let token_type_ids: Vec<i64> =
                encoding.get_type_ids().iter().map(|&t| t as i64).collect();

            let shape = [1_usize, input_ids.len()];
            let input_ids = tensor_view(shape, &input_ids, "input_ids")?;
            let attention_mask = tensor_view(shape, &attention_mask, "attention_mask")?;
            let token_type_ids = tensor_view(shape, &token_type_ids, "token_type_ids")?;

            let outputs = self
                .session
                .run(ort::inputs![
                    "input_ids" => input_ids,
                    "attention_mask" => attention_mask,
                    "token_type_ids" => token_type_ids,
                ])
                .map_err(|e| HuginnError::DataError(format!("ONNX inference failed: {}", e)))?;

            let logits = outputs
                .get("logits")
                .ok_or_else(|| HuginnError::DataError("No logits output found".to_string()))?;
            let (_, data) = logits
                .try_extract_tensor::<f32>()
                .map_err(|e| HuginnError::DataError(format!("Failed to extract logits: {}", e)))?;

            Ok(data.to_vec())
        }
    }

    /// [`ClassifyProvider`] running [`OnnxZeroShot`] on tokio's blocking pool.
    #[derive(Clone)]
    pub struct LocalZeroShotProvider {
        inner: Arc<Mutex<OnnxZeroShot>>,
    }

    impl LocalZeroShotProvider {
        pub fn new(model: OnnxZeroShot) -> Self {
            Self {
                inner: Arc::new(Mutex::new(model)),
            }
        }
    }

    #[async_trait]
    impl ClassifyProvider for LocalZeroShotProvider {
        fn name(&self) -> &str {
            "local"
        }

        #[instrument(name = "local.classify", skip(self, text, labels))]
        async fn classify(&self, text: &str, labels: &[Label]) -> Result<Candidate> {
            let inner = Arc::clone(&self.inner);
            let text = text.to_string();
            let labels = labels.to_vec();

            tokio::task::spawn_blocking(move || {
                let mut model = inner
                    .lock()
                    .map_err(|e| HuginnError::DataError(format!("model lock poisoned: {e}")))?;
                model.classify(&text, &labels)
            })
            .await
            .map_err(|e| HuginnError::DataError(format!("inference task failed: {e}")))?
        }
    }

    fn tensor_view<'a>(
        shape: [usize; 2],
        data: &'a [i64],
        name: &str,
    ) -> Result<TensorRef<'a, i64>> {
        TensorRef::from_array_view((shape, data))
            .map_err(|e| HuginnError::DataError(format!("Failed to create {name} tensor: {e}")))
    }

    /// Build an ONNX session with the appropriate execution provider.
    fn build_session(model_path: &Path, device: Device) -> Result<Session> {
        let builder = Session::builder()
            .map_err(|e| HuginnError::Configuration(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| HuginnError::Configuration(format!("Failed to set optimization level: {}", e)))?;

        let builder = match device {
            Device::Cpu => builder,
            #[cfg(feature = "cuda")]
            Device::Cuda { device_id } => {
                use ort::execution_providers::CUDAExecutionProvider;
                builder
                    .with_execution_providers([CUDAExecutionProvider::default()
                        .with_device_id(device_id as i32)
                        .build()])
                    .map_err(|e| HuginnError::Configuration(format!("Failed to configure CUDA: {}", e)))?
            }
        };

        builder
            .commit_from_file(model_path)
            .map_err(|e| HuginnError::Configuration(format!("Failed to load ONNX model: {}", e)))
    }

    /// Download model and tokenizer from HuggingFace Hub.
    fn download_model(repo_id: &str, cache_dir: Option<&Path>) -> Result<(PathBuf, PathBuf)> {
        use hf_hub::api::sync::ApiBuilder;

        let mut builder = ApiBuilder::new();
        if let Some(dir) = cache_dir {
            builder = builder.with_cache_dir(dir.to_path_buf());
        }
        let api = builder.build().map_err(|e| {
            HuginnError::Configuration(format!("Failed to initialize HF Hub API: {}", e))
        })?;
        let repo = api.model(repo_id.to_string());

        let model_path = repo.get("onnx/model.onnx").map_err(|e| {
            HuginnError::Configuration(format!("Failed to download ONNX model: {}", e))
        })?;
        let tokenizer_path = repo.get("tokenizer.json").map_err(|e| {
            HuginnError::Configuration(format!("Failed to download tokenizer: {}", e))
        })?;

        Ok((model_path, tokenizer_path))
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax() {
        let probs = softmax(&[1.0, 2.0, 3.0]);

        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1]);
        assert!(probs[1] > probs[0]);
    }

    #[test]
    fn hypothesis_names_the_label() {
        assert_eq!(hypothesis(Label::Contract), "This example is Contract.");
    }

    #[test]
    fn top_candidate_picks_highest_entailment() {
        let labels = [Label::Invoice, Label::Contract, Label::Resume];
        let candidate = top_candidate(&labels, &[0.5, 4.0, -1.0]).unwrap();
        assert_eq!(candidate.label, "Contract");
        assert!(candidate.confidence > 0.9 && candidate.confidence <= 1.0);
        // Rounded to two decimals.
        assert_eq!(candidate.confidence, (candidate.confidence * 100.0).round() / 100.0);
    }

    #[test]
    fn top_candidate_tie_goes_to_first_label() {
        let labels = [Label::Email, Label::Report];
        let candidate = top_candidate(&labels, &[1.0, 1.0]).unwrap();
        assert_eq!(candidate.label, "Email");
        assert_eq!(candidate.confidence, 0.5);
    }

    #[test]
    fn top_candidate_rejects_mismatched_scores() {
        let err = top_candidate(&[Label::Email], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, HuginnError::DataError(_)));
        assert!(top_candidate(&[], &[]).is_err());
    }
}
