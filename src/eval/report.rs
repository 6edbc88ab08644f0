//! sklearn-style classification report
//!
//! Collects per-class precision/recall/F1 plus the macro and
//! support-weighted averages into one value that renders either as an
//! aligned text table or as CSV for downstream tooling.

use std::fmt;

use crate::eval::confusion::BinaryConfusion;
use crate::eval::CLASS_NAMES;

/// Precision, recall, F1 and support for one class (or one averaging row).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics plus accuracy and the two standard averages.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    /// Indexed by class label: 0 = clear, 1 = cloud
    pub per_class: [ClassMetrics; 2],
    pub accuracy: f64,
    /// Unweighted mean over the two classes
    pub macro_avg: ClassMetrics,
    /// Mean weighted by class support
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Derive the full report from a tallied confusion matrix.
    pub fn from_confusion(confusion: &BinaryConfusion) -> Self {
        let class_metrics = |class: usize| ClassMetrics {
            precision: confusion.precision(class),
            recall: confusion.recall(class),
            f1: confusion.f1(class),
            support: confusion.support(class),
        };
        let per_class = [class_metrics(0), class_metrics(1)];

        let total = confusion.total();
        let macro_avg = ClassMetrics {
            precision: (per_class[0].precision + per_class[1].precision) / 2.0,
            recall: (per_class[0].recall + per_class[1].recall) / 2.0,
            f1: (per_class[0].f1 + per_class[1].f1) / 2.0,
            support: total,
        };

        let weighted_avg = if total == 0 {
            macro_avg
        } else {
            let weight = |class: usize| per_class[class].support as f64 / total as f64;
            ClassMetrics {
                precision: per_class[0].precision * weight(0)
                    + per_class[1].precision * weight(1),
                recall: per_class[0].recall * weight(0) + per_class[1].recall * weight(1),
                f1: per_class[0].f1 * weight(0) + per_class[1].f1 * weight(1),
                support: total,
            }
        };

        Self {
            per_class,
            accuracy: confusion.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }

    /// Total number of scored samples.
    pub fn total(&self) -> usize {
        self.per_class[0].support + self.per_class[1].support
    }

    /// Render as CSV with one row per class plus accuracy and averages.
    ///
    /// Layout follows the sklearn text report: the accuracy row leaves the
    /// precision and recall columns blank and reuses the f1-score column.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(",precision,recall,f1-score,support\n");
        for (name, m) in CLASS_NAMES.iter().zip(self.per_class.iter()) {
            csv.push_str(&format!(
                "{name},{:.6},{:.6},{:.6},{}\n",
                m.precision, m.recall, m.f1, m.support
            ));
        }
        csv.push_str(&format!(
            "accuracy,,,{:.6},{}\n",
            self.accuracy,
            self.total()
        ));
        for (name, m) in [
            ("macro avg", &self.macro_avg),
            ("weighted avg", &self.weighted_avg),
        ] {
            csv.push_str(&format!(
                "{name},{:.6},{:.6},{:.6},{}\n",
                m.precision, m.recall, m.f1, m.support
            ));
        }
        csv
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f, "{}", "-".repeat(54))?;

        for (name, m) in CLASS_NAMES.iter().zip(self.per_class.iter()) {
            writeln!(
                f,
                "{:>12} {:>10.4} {:>10.4} {:>10.4} {:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }

        writeln!(f, "{}", "-".repeat(54))?;
        for (name, m) in [
            ("macro avg", &self.macro_avg),
            ("weighted avg", &self.weighted_avg),
        ] {
            writeln!(
                f,
                "{:>12} {:>10.4} {:>10.4} {:>10.4} {:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Accuracy: {:.4}", self.accuracy)
    }
}
