//! Per-epoch training history

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};

/// Accuracy and loss per epoch for the training and validation sets
///
/// Training and validation series of the same metric share a length; the
/// accuracy and loss series are checked independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHistory")]
pub struct TrainingHistory {
    train_accs: Vec<f64>,
    train_losses: Vec<f64>,
    val_accs: Vec<f64>,
    val_losses: Vec<f64>,
}

#[derive(Deserialize)]
struct RawHistory {
    train_accs: Vec<f64>,
    train_losses: Vec<f64>,
    val_accs: Vec<f64>,
    val_losses: Vec<f64>,
}

impl TryFrom<RawHistory> for TrainingHistory {
    type Error = EvalError;

    fn try_from(raw: RawHistory) -> Result<Self> {
        Self::new(raw.train_accs, raw.train_losses, raw.val_accs, raw.val_losses)
    }
}

/// One metric's training and validation series
#[derive(Debug, Clone, Copy)]
pub struct MetricSeries<'a> {
    pub title: &'static str,
    pub train: &'a [f64],
    pub val: &'a [f64],
}

impl TrainingHistory {
    pub fn new(
        train_accs: Vec<f64>,
        train_losses: Vec<f64>,
        val_accs: Vec<f64>,
        val_losses: Vec<f64>,
    ) -> Result<Self> {
        if train_accs.len() != val_accs.len() {
            return Err(EvalError::length_mismatch(
                "Training and validation accuracies",
                train_accs.len(),
                val_accs.len(),
            ));
        }
        if train_losses.len() != val_losses.len() {
            return Err(EvalError::length_mismatch(
                "Training and validation losses",
                train_losses.len(),
                val_losses.len(),
            ));
        }
        Ok(Self {
            train_accs,
            train_losses,
            val_accs,
            val_losses,
        })
    }

    /// Load a history from a JSON file
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn accuracy(&self) -> MetricSeries<'_> {
        MetricSeries {
            title: "Accuracy",
            train: &self.train_accs,
            val: &self.val_accs,
        }
    }

    pub fn loss(&self) -> MetricSeries<'_> {
        MetricSeries {
            title: "Loss",
            train: &self.train_losses,
            val: &self.val_losses,
        }
    }

    /// Epoch with the lowest validation loss (0-based)
    pub fn best_epoch(&self) -> Option<usize> {
        self.val_losses
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_lengths_must_match() {
        let err = TrainingHistory::new(vec![0.5, 0.6], vec![0.9], vec![0.4], vec![1.0]).unwrap_err();
        assert!(err.to_string().contains("accuracies"));
    }

    #[test]
    fn test_loss_lengths_must_match() {
        let err = TrainingHistory::new(vec![0.5], vec![0.9, 0.8], vec![0.4], vec![1.0]).unwrap_err();
        assert!(err.to_string().contains("losses"));
    }

    #[test]
    fn test_accuracy_and_loss_lengths_are_independent() {
        let history =
            TrainingHistory::new(vec![0.5, 0.7, 0.8], vec![0.9], vec![0.4, 0.6, 0.7], vec![1.0])
                .unwrap();
        assert_eq!(history.accuracy().train.len(), 3);
        assert_eq!(history.loss().val.len(), 1);
    }

    #[test]
    fn test_json_validation() {
        let ok = r#"{"train_accs":[0.5,0.7],"train_losses":[0.9,0.6],"val_accs":[0.4,0.6],"val_losses":[1.0,0.8]}"#;
        let history: TrainingHistory = serde_json::from_str(ok).unwrap();
        assert_eq!(history.best_epoch(), Some(1));

        let bad = r#"{"train_accs":[0.5],"train_losses":[0.9],"val_accs":[0.4,0.6],"val_losses":[1.0]}"#;
        assert!(serde_json::from_str::<TrainingHistory>(bad).is_err());
    }
}
