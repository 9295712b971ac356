//! toxeval - evaluation toolkit for multilingual toxicity classifiers
//!
//! Runs a fine-tuned sequence classifier over a labeled corpus (one table per
//! language) and turns the predictions into:
//! - per-language confusion matrices with a pooled panel
//! - a pooled precision-recall curve with its AUC and operating point
//! - a ranked report of the most confident failures
//! - training and validation curves from a recorded history
//!
//! Metrics live in [`metrics`] and [`failures`]; [`render`] turns them into
//! SVG and HTML documents.

pub mod config;
pub mod corpus;
pub mod error;
pub mod failures;
pub mod inference;
pub mod metrics;
pub mod models;
pub mod render;

pub use error::{EvalError, Result};
pub use models::{
    Label, LabeledCorpus, LabeledRow, LanguageResults, PredictionResults, ProbPair,
};
