//! Evaluation of the trained classifier
//!
//! - `confusion`: 2x2 confusion matrix with per-class precision, recall, F1
//! - `roc`: ROC curve and area under it, computed from raw scores
//! - `report`: sklearn-style classification report with CSV export
//!
//! All metrics treat cloud (label 1) as the positive class and threshold
//! probabilities at [`DECISION_THRESHOLD`] when hard labels are needed;
//! the ROC sweep uses the raw scores directly.

mod confusion;
mod report;
mod roc;

pub use confusion::BinaryConfusion;
pub use report::{ClassMetrics, ClassificationReport};
pub use roc::{roc_curve, RocCurve, RocPoint};

/// Display names for the two classes, indexed by label value.
pub const CLASS_NAMES: [&str; 2] = ["clear", "cloud"];

/// Probability cutoff for turning scores into hard labels.
pub const DECISION_THRESHOLD: f32 = 0.5;
