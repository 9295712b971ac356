//! Core data models for toxeval
//!
//! These models are shared by the inference runner, the metric computations
//! and the renderers.

use crate::error::EvalError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Display name of the non-toxic class
pub const NON_TOXIC: &str = "NON-TOXIC";
/// Display name of the toxic class
pub const TOXIC: &str = "TOXIC";

/// Ground-truth or predicted class
///
/// Serialized as the integers 0 (non-toxic) and 1 (toxic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Label {
    NonToxic,
    Toxic,
}

impl Label {
    /// Both labels in axis order
    pub const ALL: [Label; 2] = [Label::NonToxic, Label::Toxic];

    pub fn index(self) -> usize {
        match self {
            Label::NonToxic => 0,
            Label::Toxic => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Label::NonToxic => NON_TOXIC,
            Label::Toxic => TOXIC,
        }
    }
}

impl TryFrom<i64> for Label {
    type Error = EvalError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::NonToxic),
            1 => Ok(Label::Toxic),
            other => Err(EvalError::InvalidLabel(other)),
        }
    }
}

impl From<Label> for i64 {
    fn from(label: Label) -> Self {
        label.index() as i64
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of a language table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRow {
    /// Position of the row in its language table
    pub index: usize,
    pub text: String,
    pub label: Label,
}

/// Rows per language, in insertion order
pub type LabeledCorpus = IndexMap<String, Vec<LabeledRow>>;

/// Class probabilities `(p_non_toxic, p_toxic)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbPair(pub f64, pub f64);

impl ProbPair {
    pub fn non_toxic(&self) -> f64 {
        self.0
    }

    pub fn toxic(&self) -> f64 {
        self.1
    }

    /// Probability of the more likely class
    pub fn confidence(&self) -> f64 {
        self.non_toxic().max(self.toxic())
    }

    /// Hard decision: toxic iff `p_toxic` is strictly above `threshold`
    pub fn decide(&self, threshold: f64) -> Label {
        if self.toxic() > threshold {
            Label::Toxic
        } else {
            Label::NonToxic
        }
    }
}

/// Prediction output for a single language
///
/// The sequences always have the same length and are aligned with the
/// language's corpus rows. Probabilities are absent for label-only files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLanguageResults")]
pub struct LanguageResults {
    true_labels: Vec<Label>,
    pred_labels: Vec<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pred_probs: Option<Vec<ProbPair>>,
}

#[derive(Deserialize)]
struct RawLanguageResults {
    true_labels: Vec<Label>,
    pred_labels: Vec<Label>,
    #[serde(default)]
    pred_probs: Option<Vec<ProbPair>>,
}

impl TryFrom<RawLanguageResults> for LanguageResults {
    type Error = EvalError;

    fn try_from(raw: RawLanguageResults) -> Result<Self, Self::Error> {
        match raw.pred_probs {
            Some(probs) => Self::new(raw.true_labels, raw.pred_labels, probs),
            None => Self::labels_only(raw.true_labels, raw.pred_labels),
        }
    }
}

impl LanguageResults {
    pub fn new(
        true_labels: Vec<Label>,
        pred_labels: Vec<Label>,
        pred_probs: Vec<ProbPair>,
    ) -> crate::Result<Self> {
        if true_labels.len() != pred_labels.len() {
            return Err(EvalError::length_mismatch(
                "True and predicted labels",
                true_labels.len(),
                pred_labels.len(),
            ));
        }
        if true_labels.len() != pred_probs.len() {
            return Err(EvalError::length_mismatch(
                "True labels and predicted probabilities",
                true_labels.len(),
                pred_probs.len(),
            ));
        }
        Ok(Self {
            true_labels,
            pred_labels,
            pred_probs: Some(pred_probs),
        })
    }

    /// Results without probabilities (enough for confusion matrices)
    pub fn labels_only(true_labels: Vec<Label>, pred_labels: Vec<Label>) -> crate::Result<Self> {
        if true_labels.len() != pred_labels.len() {
            return Err(EvalError::length_mismatch(
                "True and predicted labels",
                true_labels.len(),
                pred_labels.len(),
            ));
        }
        Ok(Self {
            true_labels,
            pred_labels,
            pred_probs: None,
        })
    }

    pub fn true_labels(&self) -> &[Label] {
        &self.true_labels
    }

    pub fn pred_labels(&self) -> &[Label] {
        &self.pred_labels
    }

    /// Model probabilities, `None` for label-only results
    pub fn pred_probs(&self) -> Option<&[ProbPair]> {
        self.pred_probs.as_deref()
    }

    /// Model probabilities, or `MissingProbabilities` naming `language`
    pub fn require_probs(&self, language: &str) -> crate::Result<&[ProbPair]> {
        self.pred_probs()
            .ok_or_else(|| EvalError::MissingProbabilities(language.to_string()))
    }

    pub fn len(&self) -> usize {
        self.true_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.true_labels.is_empty()
    }
}

/// Prediction output for every language, in corpus order
pub type PredictionResults = IndexMap<String, LanguageResults>;

/// Title-case a language key for display ("english" -> "English")
///
/// Every alphabetic run starts with an uppercase letter, the rest is lowercased.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
