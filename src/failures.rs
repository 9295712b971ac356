//! Most confident misclassifications per language
//!
//! Mismatched rows are split into false toxic (non-toxic text predicted
//! toxic) and false non-toxic (toxic text predicted non-toxic), ranked by
//! confidence and truncated to the top K.

use crate::error::{EvalError, Result};
use crate::models::{Label, LabeledCorpus, PredictionResults, NON_TOXIC, TOXIC};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of failures kept per language and kind
pub const DEFAULT_TOP_FAILURES: usize = 5;

/// Error class of a misclassified row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Non-toxic text predicted toxic (false positive)
    FalseToxic,
    /// Toxic text predicted non-toxic (false negative)
    FalseNonToxic,
}

impl FailureKind {
    pub fn title(self) -> String {
        match self {
            FailureKind::FalseToxic => format!("False {}", TOXIC),
            FailureKind::FalseNonToxic => format!("False {}", NON_TOXIC),
        }
    }
}

/// A misclassified row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Row index in the language table
    pub row: usize,
    pub true_label: Label,
    pub pred_label: Label,
    /// Probability of the more likely class
    pub confidence: f64,
    pub text: String,
}

/// Ranked failures for one language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageFailures {
    pub false_toxic: Vec<FailureRecord>,
    pub false_non_toxic: Vec<FailureRecord>,
}

impl LanguageFailures {
    /// Both categories in display order
    pub fn categories(&self) -> [(FailureKind, &[FailureRecord]); 2] {
        [
            (FailureKind::FalseToxic, self.false_toxic.as_slice()),
            (FailureKind::FalseNonToxic, self.false_non_toxic.as_slice()),
        ]
    }

    pub fn total(&self) -> usize {
        self.false_toxic.len() + self.false_non_toxic.len()
    }
}

/// Failures per language, in corpus order
pub type FailureReport = IndexMap<String, LanguageFailures>;

/// Find the `top_k` most confident failures of each kind for every language
///
/// Rows are matched with results by position; a language whose row count
/// differs from its result length is rejected.
pub fn find_top_failures(
    corpus: &LabeledCorpus,
    results: &PredictionResults,
    top_k: usize,
) -> Result<FailureReport> {
    let mut report = FailureReport::new();

    for (lang, rows) in corpus {
        let lang_results = results
            .get(lang)
            .ok_or_else(|| EvalError::MissingLanguage(lang.clone()))?;

        if rows.len() != lang_results.len() {
            return Err(EvalError::length_mismatch(
                format!("Corpus rows and prediction results for '{}'", lang),
                rows.len(),
                lang_results.len(),
            ));
        }

        let probs = lang_results.require_probs(lang)?;
        let mut failures = LanguageFailures::default();
        let aligned = rows
            .iter()
            .zip(lang_results.true_labels())
            .zip(lang_results.pred_labels())
            .zip(probs);

        for (((row, &true_label), &pred_label), probs) in aligned {
            if true_label == pred_label {
                continue;
            }
            let record = FailureRecord {
                row: row.index,
                true_label,
                pred_label,
                confidence: probs.confidence(),
                text: row.text.clone(),
            };
            match true_label {
                Label::NonToxic => failures.false_toxic.push(record),
                Label::Toxic => failures.false_non_toxic.push(record),
            }
        }

        rank_and_truncate(&mut failures.false_toxic, top_k);
        rank_and_truncate(&mut failures.false_non_toxic, top_k);

        debug!(
            "{}: {} false toxic, {} false non-toxic kept",
            lang,
            failures.false_toxic.len(),
            failures.false_non_toxic.len()
        );
        report.insert(lang.clone(), failures);
    }

    Ok(report)
}

/// Stable sort by decreasing confidence, keep the first `top_k`
fn rank_and_truncate(records: &mut Vec<FailureRecord>, top_k: usize) {
    records.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    records.truncate(top_k);
}
