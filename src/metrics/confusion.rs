//! Confusion matrices per language plus a pooled view

use crate::error::{EvalError, Result};
use crate::models::{Label, PredictionResults};
use serde::{Deserialize, Serialize};

/// Key of the pooled panel
pub const POOLED_PANEL: &str = "all languages";

/// Languages expected by the 2x2 grid (the pooled panel fills the fourth cell)
pub const EXPECTED_LANGUAGES: usize = 3;

/// 2x2 counts indexed `[true][predicted]`, axes ordered [non-toxic, toxic]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    /// Create from aligned ground truth and predictions
    pub fn from_labels(true_labels: &[Label], pred_labels: &[Label]) -> Result<Self> {
        if true_labels.len() != pred_labels.len() {
            return Err(EvalError::length_mismatch(
                "True and predicted labels",
                true_labels.len(),
                pred_labels.len(),
            ));
        }

        let mut matrix = Self::default();
        for (t, p) in true_labels.iter().zip(pred_labels) {
            matrix.counts[t.index()][p.index()] += 1;
        }
        Ok(matrix)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        self.counts[0][0] + self.counts[1][1]
    }

    /// Exact matches as a percentage (0 for an empty matrix)
    pub fn accuracy_percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.correct() as f64 / total as f64 * 100.0
    }

    /// Rows normalized by true-label totals, as percentages
    ///
    /// A true class with no samples yields a row of zeros.
    pub fn row_percentages(&self) -> [[f64; 2]; 2] {
        let mut out = [[0.0; 2]; 2];
        for (row, counts) in self.counts.iter().enumerate() {
            let sum: usize = counts.iter().sum();
            if sum == 0 {
                continue;
            }
            for (col, &count) in counts.iter().enumerate() {
                out[row][col] = count as f64 / sum as f64 * 100.0;
            }
        }
        out
    }
}

/// One cell of the confusion grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionPanel {
    pub language: String,
    pub matrix: ConfusionMatrix,
    /// Row-normalized percentages, `[true][predicted]`
    pub percentages: [[f64; 2]; 2],
    pub accuracy: f64,
}

impl ConfusionPanel {
    fn new(language: &str, true_labels: &[Label], pred_labels: &[Label]) -> Result<Self> {
        let matrix = ConfusionMatrix::from_labels(true_labels, pred_labels)?;
        Ok(Self {
            language: language.to_string(),
            percentages: matrix.row_percentages(),
            accuracy: matrix.accuracy_percent(),
            matrix,
        })
    }

    /// Accuracy rounded to two decimals, as shown in panel titles
    pub fn rounded_accuracy(&self) -> f64 {
        (self.accuracy * 100.0).round() / 100.0
    }
}

/// Confusion panels for every language followed by the pooled panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionReport {
    pub panels: Vec<ConfusionPanel>,
}

impl ConfusionReport {
    /// Build the fixed 2x2 grid: three languages plus "all languages"
    ///
    /// Probabilities in `results` are ignored.
    pub fn build(results: &PredictionResults) -> Result<Self> {
        if results.len() != EXPECTED_LANGUAGES || results.contains_key(POOLED_PANEL) {
            return Err(EvalError::LanguageCount {
                expected: EXPECTED_LANGUAGES,
                actual: results.len(),
                languages: results.keys().cloned().collect(),
            });
        }

        let mut pooled_true = Vec::new();
        let mut pooled_pred = Vec::new();
        for lang_results in results.values() {
            pooled_true.extend_from_slice(lang_results.true_labels());
            pooled_pred.extend_from_slice(lang_results.pred_labels());
        }

        if pooled_true.len() != pooled_pred.len() {
            return Err(EvalError::length_mismatch(
                "Pooled true and predicted labels",
                pooled_true.len(),
                pooled_pred.len(),
            ));
        }

        let mut panels = Vec::with_capacity(EXPECTED_LANGUAGES + 1);
        for (lang, lang_results) in results {
            panels.push(ConfusionPanel::new(
                lang,
                lang_results.true_labels(),
                lang_results.pred_labels(),
            )?);
        }
        panels.push(ConfusionPanel::new(POOLED_PANEL, &pooled_true, &pooled_pred)?);

        Ok(Self { panels })
    }

    /// The pooled "all languages" panel
    pub fn pooled(&self) -> Option<&ConfusionPanel> {
        self.panels.last()
    }
}
