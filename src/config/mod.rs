//! Configuration module for toxeval
//!
//! This module handles:
//! - Evaluation configuration (toxeval.toml)
//! - Inference defaults (base model, batch size, threshold, device)
//! - Report defaults (failures per category)

mod eval_config;

pub use eval_config::{
    load_config, DeviceChoice, EvalConfig, InferenceConfig, ReportConfig, CONFIG_FILE_NAME,
    EXAMPLE_CONFIG,
};
