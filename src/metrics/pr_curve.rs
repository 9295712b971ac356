//! Pooled precision-recall curve
//!
//! Points follow scikit-learn's `precision_recall_curve` without dropping
//! intermediate points: one point per distinct score, sorted by decreasing
//! score, reversed so that recall decreases along the arrays, with a final
//! `(precision 1, recall 0)` point appended. The area uses the trapezoidal
//! rule over recall.
//!
//! The operating point maximizes the geometric mean `sqrt(precision * recall)`,
//! taking the first index on ties.

use crate::error::{EvalError, Result};
use crate::models::{Label, PredictionResults};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Precision-recall curve with its area and chosen operating point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrCurve {
    /// Precision per point; one more element than `thresholds`
    pub precision: Vec<f64>,
    /// Recall per point, non-increasing
    pub recall: Vec<f64>,
    /// Distinct scores in increasing order
    pub thresholds: Vec<f64>,
    pub auc: f64,
    pub optimal_index: usize,
    pub optimal_threshold: f64,
}

impl PrCurve {
    /// Pool every language's true labels and toxic probabilities
    ///
    /// Fails with `MissingProbabilities` if any language has labels only.
    pub fn from_results(results: &PredictionResults) -> Result<Self> {
        let mut labels = Vec::new();
        let mut scores = Vec::new();
        for (lang, lang_results) in results {
            let probs = lang_results.require_probs(lang)?;
            labels.extend_from_slice(lang_results.true_labels());
            scores.extend(probs.iter().map(|p| p.toxic()));
        }
        Self::compute(&labels, &scores)
    }

    /// Compute the curve for aligned labels and toxic scores
    pub fn compute(labels: &[Label], scores: &[f64]) -> Result<Self> {
        if labels.len() != scores.len() {
            return Err(EvalError::length_mismatch(
                "Labels and scores",
                labels.len(),
                scores.len(),
            ));
        }
        if labels.is_empty() {
            return Err(EvalError::EmptyInput(
                "precision-recall curve needs at least one prediction".to_string(),
            ));
        }
        if scores.iter().any(|s| s.is_nan()) {
            return Err(EvalError::invalid_argument("scores contain NaN"));
        }

        let (tps, fps, desc_thresholds) = binary_clf_curve(labels, scores);
        let total_pos = tps.last().copied().unwrap_or(0.0);

        if total_pos == 0.0 {
            debug!("No positive samples; recall is set to 1 for all thresholds");
        }

        let mut precision: Vec<f64> = tps
            .iter()
            .zip(&fps)
            .map(|(&tp, &fp)| {
                let predicted = tp + fp;
                if predicted == 0.0 {
                    0.0
                } else {
                    tp / predicted
                }
            })
            .collect();
        let mut recall: Vec<f64> = tps
            .iter()
            .map(|&tp| if total_pos == 0.0 { 1.0 } else { tp / total_pos })
            .collect();
        let mut thresholds = desc_thresholds;

        precision.reverse();
        recall.reverse();
        thresholds.reverse();
        precision.push(1.0);
        recall.push(0.0);

        let auc = trapezoid_area(&recall, &precision);
        let optimal_index = geometric_mean_argmax(&precision, &recall);
        let optimal_threshold = thresholds
            .get(optimal_index)
            .or_else(|| thresholds.last())
            .copied()
            .ok_or_else(|| EvalError::EmptyInput("no thresholds".to_string()))?;

        Ok(Self {
            precision,
            recall,
            thresholds,
            auc,
            optimal_index,
            optimal_threshold,
        })
    }

    /// `(recall, precision)` at the operating point
    pub fn optimal_point(&self) -> (f64, f64) {
        (
            self.recall[self.optimal_index],
            self.precision[self.optimal_index],
        )
    }
}

/// Cumulative true/false positives at each distinct score, by decreasing score
fn binary_clf_curve(labels: &[Label], scores: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut tps = Vec::new();
    let mut fps = Vec::new();
    let mut thresholds = Vec::new();
    let mut tp = 0.0;

    for (pos, &i) in order.iter().enumerate() {
        if labels[i] == Label::Toxic {
            tp += 1.0;
        }
        let last_of_group = order
            .get(pos + 1)
            .is_none_or(|&next| scores[next] != scores[i]);
        if last_of_group {
            tps.push(tp);
            fps.push((pos + 1) as f64 - tp);
            thresholds.push(scores[i]);
        }
    }

    (tps, fps, thresholds)
}

/// Trapezoidal area under `y(x)` for monotonic `x`
fn trapezoid_area(x: &[f64], y: &[f64]) -> f64 {
    let area: f64 = x
        .windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum();
    area.abs()
}

/// First index maximizing `sqrt(precision * recall)`
fn geometric_mean_argmax(precision: &[f64], recall: &[f64]) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, (p, r)) in precision.iter().zip(recall).enumerate() {
        let score = (p * r).sqrt();
        if score > best_score {
            best = i;
            best_score = score;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Label::{NonToxic as N, Toxic as T};
    use crate::models::{LanguageResults, ProbPair};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_curve_points_match_reference() {
        // precision_recall_curve([0, 0, 1, 1], [0.1, 0.4, 0.35, 0.8])
        let curve = PrCurve::compute(&[N, N, T, T], &[0.1, 0.4, 0.35, 0.8]).unwrap();
        let expected_p = [0.5, 2.0 / 3.0, 0.5, 1.0, 1.0];
        let expected_r = [1.0, 1.0, 0.5, 0.5, 0.0];
        assert_eq!(curve.thresholds, vec![0.1, 0.35, 0.4, 0.8]);
        for (got, want) in curve.precision.iter().zip(expected_p) {
            assert!(close(*got, want), "precision {:?}", curve.precision);
        }
        for (got, want) in curve.recall.iter().zip(expected_r) {
            assert!(close(*got, want), "recall {:?}", curve.recall);
        }
        // trapezoids: 0 + 0.5*(2/3+0.5)/2 + 0 + 0.5*(1+1)/2
        assert!(close(curve.auc, 0.5 * (2.0 / 3.0 + 0.5) / 2.0 + 0.5));
    }

    #[test]
    fn test_ties_collapse_to_one_point() {
        let curve = PrCurve::compute(&[N, T, T], &[0.5, 0.5, 0.9]).unwrap();
        assert_eq!(curve.thresholds, vec![0.5, 0.9]);
        assert_eq!(curve.precision.len(), 3);
        assert!(close(curve.precision[0], 2.0 / 3.0));
    }

    #[test]
    fn test_geometric_mean_differs_from_f1() {
        // Ranked: 5 toxic, 5 non-toxic, 3 toxic, 10 non-toxic, 2 toxic.
        // After the first 5: p=1.0, r=0.5 -> gm 0.707, f1 0.667
        // After the first 13: p=8/13, r=0.8 -> gm 0.702, f1 0.696
        let mut labels = Vec::new();
        for (label, n) in [(T, 5), (N, 5), (T, 3), (N, 10), (T, 2)] {
            labels.extend(std::iter::repeat(label).take(n));
        }
        let scores: Vec<f64> = (0..labels.len())
            .map(|i| (labels.len() - i) as f64 / (labels.len() + 1) as f64)
            .collect();
        let curve = PrCurve::compute(&labels, &scores).unwrap();

        let f1 = |i: usize| {
            let (p, r) = (curve.precision[i], curve.recall[i]);
            if p + r == 0.0 {
                0.0
            } else {
                2.0 * p * r / (p + r)
            }
        };
        let f1_best = (0..curve.precision.len())
            .fold(0, |best, i| if f1(i) > f1(best) { i } else { best });

        let (r, p) = curve.optimal_point();
        assert!(close(p, 1.0) && close(r, 0.5), "gm point p={} r={}", p, r);
        assert!(close(curve.precision[f1_best], 8.0 / 13.0));
        assert!(close(curve.recall[f1_best], 0.8));
        assert_ne!(curve.optimal_index, f1_best);
        assert_eq!(curve.optimal_threshold, curve.thresholds[curve.optimal_index]);
        assert_eq!(curve.optimal_threshold, scores[4]);
    }

    #[test]
    fn test_no_positives_sets_recall_to_one() {
        let curve = PrCurve::compute(&[N, N], &[0.2, 0.7]).unwrap();
        assert_eq!(curve.recall, vec![1.0, 1.0, 0.0]);
        assert_eq!(curve.precision, vec![0.0, 0.0, 1.0]);
        assert_eq!(curve.optimal_index, 0);
        assert_eq!(curve.optimal_threshold, 0.2);
    }

    #[test]
    fn test_rejects_empty_and_nan() {
        assert!(matches!(
            PrCurve::compute(&[], &[]),
            Err(EvalError::EmptyInput(_))
        ));
        assert!(PrCurve::compute(&[T], &[f64::NAN]).is_err());
        assert!(PrCurve::compute(&[T, N], &[0.3]).is_err());
    }

    #[test]
    fn test_from_results_pools_toxic_probability() {
        let mut results = PredictionResults::new();
        results.insert(
            "en".into(),
            LanguageResults::new(
                vec![N, T],
                vec![N, T],
                vec![ProbPair(0.9, 0.1), ProbPair(0.2, 0.8)],
            )
            .unwrap(),
        );
        results.insert(
            "es".into(),
            LanguageResults::new(vec![T], vec![N], vec![ProbPair(0.6, 0.4)]).unwrap(),
        );
        let curve = PrCurve::from_results(&results).unwrap();
        assert_eq!(curve.thresholds, vec![0.1, 0.4, 0.8]);
        assert!(close(curve.recall[0], 1.0));
    }

    #[test]
    fn test_from_results_requires_probabilities() {
        let mut results = PredictionResults::new();
        results.insert(
            "en".into(),
            LanguageResults::new(
                vec![N, T],
                vec![N, T],
                vec![ProbPair(0.9, 0.1), ProbPair(0.2, 0.8)],
            )
            .unwrap(),
        );
        results.insert(
            "it".into(),
            LanguageResults::labels_only(vec![N, T, T, N], vec![T, N, T, N]).unwrap(),
        );
        let err = PrCurve::from_results(&results).unwrap_err();
        assert!(matches!(err, EvalError::MissingProbabilities(ref lang) if lang == "it"));
    }
}
