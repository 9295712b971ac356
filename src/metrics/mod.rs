//! Evaluation metrics
//!
//! Pure computations over prediction results. Rendering lives in
//! [`crate::render`].

pub mod confusion;
pub mod history;
pub mod pr_curve;

pub use confusion::{ConfusionMatrix, ConfusionPanel, ConfusionReport, POOLED_PANEL};
pub use history::TrainingHistory;
pub use pr_curve::PrCurve;
