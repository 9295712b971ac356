//! DistilBERT sequence classifier on candle
//!
//! Mirrors `DistilBertForSequenceClassification`: encoder, first-token pooling,
//! `pre_classifier` linear layer, ReLU, two-way `classifier` layer, softmax.

use super::SequenceClassifier;
use crate::config::DeviceChoice;
use crate::error::{EvalError, Result};
use crate::models::ProbPair;
use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{linear, Linear, Module, VarBuilder};
use candle_transformers::models::distilbert::{Config, DistilBertModel};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::{debug, info};

/// Number of output classes
const NUM_LABELS: usize = 2;

/// Prefix of encoder weights in a sequence-classification state dict
const ENCODER_PREFIX: &str = "distilbert";

/// Pick the compute device
pub fn select_device(choice: DeviceChoice) -> Result<Device> {
    let device = match choice {
        DeviceChoice::Cpu => Device::Cpu,
        DeviceChoice::Cuda => Device::new_cuda(0)?,
        DeviceChoice::Auto => Device::cuda_if_available(0)?,
    };
    info!("Using {} device", if device.is_cuda() { "CUDA" } else { "CPU" });
    Ok(device)
}

/// Hidden size read straight from `config.json`
#[derive(Deserialize)]
struct HeadDims {
    dim: usize,
}

/// Architecture configuration and tokenizer of the base model
pub struct BaseModel {
    config_json: String,
    tokenizer: Tokenizer,
}

impl BaseModel {
    /// Use `base` as a local directory if it is one, otherwise as a hub model id
    pub fn resolve(base: &str) -> Result<Self> {
        let dir = Path::new(base);
        if dir.is_dir() {
            debug!("Loading base model files from {}", dir.display());
            Self::from_files(&dir.join("config.json"), &dir.join("tokenizer.json"))
        } else {
            let (config, tokenizer) = fetch_from_hub(base)?;
            Self::from_files(&config, &tokenizer)
        }
    }

    pub fn from_files(config_path: &Path, tokenizer_path: &Path) -> Result<Self> {
        let config_json = std::fs::read_to_string(config_path).map_err(|e| {
            EvalError::model(format!("reading {}: {}", config_path.display(), e))
        })?;
        let tokenizer = Tokenizer::from_file(tokenizer_path)?;
        Ok(Self::from_parts(config_json, tokenizer))
    }

    /// Build from an already loaded configuration and tokenizer
    pub fn from_parts(config_json: String, tokenizer: Tokenizer) -> Self {
        Self {
            config_json,
            tokenizer,
        }
    }
}

fn fetch_from_hub(model_id: &str) -> Result<(PathBuf, PathBuf)> {
    use hf_hub::api::sync::Api;

    info!("Fetching {} from the Hugging Face hub", model_id);
    let api = Api::new().map_err(|e| EvalError::model(format!("hub API init failed: {}", e)))?;
    let repo = api.model(model_id.to_string());
    let config = repo
        .get("config.json")
        .map_err(|e| EvalError::model(format!("{}: config.json: {}", model_id, e)))?;
    let tokenizer = repo
        .get("tokenizer.json")
        .map_err(|e| EvalError::model(format!("{}: tokenizer.json: {}", model_id, e)))?;
    Ok((config, tokenizer))
}

/// Fine-tuned DistilBERT toxicity classifier
pub struct DistilBertClassifier {
    encoder: DistilBertModel,
    pre_classifier: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    device: Device,
}

impl DistilBertClassifier {
    /// Load a fine-tuned checkpoint on top of `base`
    ///
    /// `.safetensors` files are memory-mapped; `.pt`, `.pth` and `.bin` are read
    /// as PyTorch state dicts.
    pub fn load(
        checkpoint: &Path,
        base: BaseModel,
        device: &Device,
        max_length: usize,
    ) -> Result<Self> {
        if !checkpoint.is_file() {
            return Err(EvalError::ModelNotFound(checkpoint.to_path_buf()));
        }
        let vb = load_weights(checkpoint, device)?;
        let classifier = Self::from_var_builder(vb, base, device, max_length)?;
        info!("Loaded classifier from {}", checkpoint.display());
        Ok(classifier)
    }

    /// Build the classifier from already opened weights
    ///
    /// Encoder weights are read under `distilbert.` when present, otherwise
    /// from the root; the heads are always read from the root.
    pub fn from_var_builder(
        vb: VarBuilder<'_>,
        base: BaseModel,
        device: &Device,
        max_length: usize,
    ) -> Result<Self> {
        if max_length == 0 {
            return Err(EvalError::invalid_argument("max length must be at least 1"));
        }

        let config: Config = serde_json::from_str(&base.config_json)?;
        let dims: HeadDims = serde_json::from_str(&base.config_json)?;

        let encoder_vb = if vb.contains_tensor(&format!(
            "{}.embeddings.word_embeddings.weight",
            ENCODER_PREFIX
        )) {
            vb.pp(ENCODER_PREFIX)
        } else {
            vb.clone()
        };
        let encoder = DistilBertModel::load(encoder_vb, &config)?;
        let pre_classifier = linear(dims.dim, dims.dim, vb.pp("pre_classifier"))?;
        let classifier = linear(dims.dim, NUM_LABELS, vb.pp("classifier"))?;

        let mut tokenizer = base.tokenizer;
        let padding = PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..tokenizer.get_padding().cloned().unwrap_or_default()
        };
        tokenizer.with_padding(Some(padding));
        tokenizer.with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))?;

        debug!("Classifier hidden size {}", dims.dim);

        Ok(Self {
            encoder,
            pre_classifier,
            classifier,
            tokenizer,
            device: device.clone(),
        })
    }

    /// Token ids and the attention mask (1 at padded positions)
    fn encode(&self, texts: &[&str]) -> Result<(Tensor, Tensor)> {
        let encodings = self.tokenizer.encode_batch(texts.to_vec(), true)?;
        let seq_len = encodings.first().map(|e| e.get_ids().len()).unwrap_or(0);

        let mut ids = Vec::with_capacity(texts.len() * seq_len);
        let mut padded = Vec::with_capacity(texts.len() * seq_len);
        for encoding in &encodings {
            ids.extend_from_slice(encoding.get_ids());
            padded.extend(encoding.get_attention_mask().iter().map(|&m| u8::from(m == 0)));
        }

        let input_ids = Tensor::from_vec(ids, (texts.len(), seq_len), &self.device)?;
        let mask = Tensor::from_vec(padded, (texts.len(), 1, 1, seq_len), &self.device)?;
        Ok((input_ids, mask))
    }
}

impl SequenceClassifier for DistilBertClassifier {
    fn classify_batch(&self, texts: &[&str]) -> Result<Vec<ProbPair>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let (input_ids, mask) = self.encode(texts)?;
        let hidden = self.encoder.forward(&input_ids, &mask)?;
        let pooled = hidden.i((.., 0))?;
        let pooled = self.pre_classifier.forward(&pooled)?.relu()?;
        let logits = self.classifier.forward(&pooled)?;
        let probs = candle_nn::ops::softmax(&logits, D::Minus1)?
            .to_dtype(DType::F64)?
            .to_vec2::<f64>()?;

        Ok(probs
            .into_iter()
            .map(|row| ProbPair(row[0], row[1]))
            .collect())
    }
}

fn load_weights(checkpoint: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let ext = checkpoint
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let vb = match ext.as_str() {
        // SAFETY: the file is only read while mapped; candle validates the layout.
        "safetensors" => unsafe {
            VarBuilder::from_mmaped_safetensors(&[checkpoint], DType::F32, device)?
        },
        "pt" | "pth" | "bin" => VarBuilder::from_pth(checkpoint, DType::F32, device)?,
        other => {
            return Err(EvalError::model(format!(
                "Unsupported checkpoint format '{}' for {}: expected .safetensors, .pt, .pth or .bin",
                other,
                checkpoint.display()
            )))
        }
    };
    Ok(vb)
}
