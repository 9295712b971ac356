//! Batched inference over a labeled corpus
//!
//! The runner is model-agnostic: anything implementing [`SequenceClassifier`]
//! can be evaluated. [`DistilBertClassifier`] is the production backend.

pub mod distilbert;

pub use distilbert::{select_device, BaseModel, DistilBertClassifier};

use crate::config::InferenceConfig;
use crate::error::{EvalError, Result};
use crate::models::{LabeledCorpus, LanguageResults, PredictionResults, ProbPair, title_case};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info};

/// A binary text classifier returning `(p_non_toxic, p_toxic)` per input
pub trait SequenceClassifier {
    /// Classify one batch; the output is aligned with `texts`
    fn classify_batch(&self, texts: &[&str]) -> Result<Vec<ProbPair>>;
}

/// Knobs for [`predict_with_probabilities`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub batch_size: usize,
    /// Predict toxic iff `p_toxic` is strictly above this value
    pub threshold: f64,
    /// Draw a progress bar per language
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            batch_size: 32,
            threshold: 0.5,
            show_progress: true,
        }
    }
}

impl RunOptions {
    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(EvalError::invalid_argument("batch size must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(EvalError::invalid_argument(format!(
                "confidence threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Run `classifier` over every language of `corpus`
///
/// Languages are processed in corpus order; rows keep their order within a
/// language, so results stay index-aligned with the corpus.
pub fn predict_with_probabilities<C: SequenceClassifier + ?Sized>(
    classifier: &C,
    corpus: &LabeledCorpus,
    options: &RunOptions,
) -> Result<PredictionResults> {
    options.validate()?;

    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} batches")
        .map_err(|e| EvalError::invalid_argument(e.to_string()))?
        .progress_chars("█▓░");

    let mut results = PredictionResults::new();
    for (lang, rows) in corpus {
        let n_batches = rows.len().div_ceil(options.batch_size);
        let bar = if options.show_progress {
            ProgressBar::new(n_batches as u64)
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(bar_style.clone());
        bar.set_message(format!("Predicting for {}", title_case(lang)));

        let mut true_labels = Vec::with_capacity(rows.len());
        let mut pred_labels = Vec::with_capacity(rows.len());
        let mut pred_probs = Vec::with_capacity(rows.len());

        for batch in rows.chunks(options.batch_size) {
            let texts: Vec<&str> = batch.iter().map(|r| r.text.as_str()).collect();
            let probs = classifier.classify_batch(&texts)?;
            if probs.len() != batch.len() {
                return Err(EvalError::length_mismatch(
                    format!("Batch texts and classifier outputs for '{}'", lang),
                    batch.len(),
                    probs.len(),
                ));
            }

            for (row, p) in batch.iter().zip(probs) {
                true_labels.push(row.label);
                pred_labels.push(p.decide(options.threshold));
                pred_probs.push(p);
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        let lang_results = LanguageResults::new(true_labels, pred_labels, pred_probs)?;
        let correct = lang_results
            .true_labels()
            .iter()
            .zip(lang_results.pred_labels())
            .filter(|(t, p)| t == p)
            .count();
        info!(
            "Predicted {} rows for {} ({} correct)",
            lang_results.len(),
            lang,
            correct
        );
        results.insert(lang.clone(), lang_results);
    }

    Ok(results)
}

/// Load the DistilBERT checkpoint and run it over `corpus`
///
/// The model lives only for the duration of the call.
pub fn run_inference(
    checkpoint: &Path,
    corpus: &LabeledCorpus,
    config: &InferenceConfig,
    show_progress: bool,
) -> Result<PredictionResults> {
    let options = RunOptions {
        batch_size: config.batch_size,
        threshold: config.threshold,
        show_progress,
    };
    options.validate()?;
    if !checkpoint.is_file() {
        return Err(EvalError::ModelNotFound(checkpoint.to_path_buf()));
    }

    let device = select_device(config.device)?;
    debug!("Using device {:?}", device);
    let base = BaseModel::resolve(&config.base_model)?;
    let classifier = DistilBertClassifier::load(checkpoint, base, &device, config.max_length)?;

    predict_with_probabilities(&classifier, corpus, &options)
}
