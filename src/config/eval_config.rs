//! Evaluation configuration support
//!
//! Loads configuration from `toxeval.toml` in the working directory.
//!
//! # Configuration Format
//!
//! ```toml
//! [inference]
//! base_model = "distilbert-base-multilingual-cased"
//! batch_size = 32
//! threshold = 0.5
//! max_length = 512
//! device = "auto"
//!
//! [report]
//! top_failures = 5
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "toxeval.toml";

/// Environment variable overriding `inference.device`
const DEVICE_ENV: &str = "TOXEVAL_DEVICE";

/// Example written by `toxeval init`
pub const EXAMPLE_CONFIG: &str = r#"# toxeval configuration

[inference]
# Local directory or Hugging Face model id providing config.json and tokenizer.json
base_model = "distilbert-base-multilingual-cased"
batch_size = 32
# Predict toxic when p(toxic) is strictly above this value
threshold = 0.5
max_length = 512
# cpu, cuda or auto
device = "auto"

[report]
# Failures kept per language and error class
top_failures = 5
"#;

/// Compute device selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceChoice {
    Cpu,
    Cuda,
    #[default]
    Auto,
}

impl FromStr for DeviceChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cpu" => Ok(DeviceChoice::Cpu),
            "cuda" | "gpu" => Ok(DeviceChoice::Cuda),
            "auto" => Ok(DeviceChoice::Auto),
            _ => Err(format!(
                "Unknown device '{}'. Valid devices: cpu, cuda, auto",
                s
            )),
        }
    }
}

impl std::fmt::Display for DeviceChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceChoice::Cpu => write!(f, "cpu"),
            DeviceChoice::Cuda => write!(f, "cuda"),
            DeviceChoice::Auto => write!(f, "auto"),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Inference runner defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Local directory or hub id with `config.json` and `tokenizer.json`
    #[serde(default = "default_base_model")]
    pub base_model: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Confidence threshold for the toxic class
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Maximum tokens per text after truncation
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default)]
    pub device: DeviceChoice,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_model: default_base_model(),
            batch_size: default_batch_size(),
            threshold: default_threshold(),
            max_length: default_max_length(),
            device: DeviceChoice::default(),
        }
    }
}

/// Report defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_top_failures")]
    pub top_failures: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_failures: default_top_failures(),
        }
    }
}

fn default_base_model() -> String {
    "distilbert-base-multilingual-cased".to_string()
}

fn default_batch_size() -> usize {
    32
}

fn default_threshold() -> f64 {
    0.5
}

fn default_max_length() -> usize {
    512
}

fn default_top_failures() -> usize {
    5
}

impl EvalConfig {
    /// Apply environment overrides (highest priority after CLI flags)
    fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(DEVICE_ENV) {
            match value.parse::<DeviceChoice>() {
                Ok(device) => self.inference.device = device,
                Err(e) => warn!("Ignoring {}: {}", DEVICE_ENV, e),
            }
        }
    }
}

/// Load configuration
///
/// `explicit` wins over `toxeval.toml` in `dir`. A missing or malformed file
/// falls back to defaults.
pub fn load_config(dir: &Path, explicit: Option<&Path>) -> EvalConfig {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.join(CONFIG_FILE_NAME));

    let mut config = if path.exists() {
        match load_toml_config(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                EvalConfig::default()
            }
        }
    } else {
        debug!("No config found at {}, using defaults", path.display());
        EvalConfig::default()
    };

    config.apply_env();
    config
}

fn load_toml_config(path: &Path) -> anyhow::Result<EvalConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: EvalConfig = toml::from_str(&content)?;
    Ok(config)
}
