//! Binary confusion matrix

use crate::error::{Error, Result};

/// 2x2 confusion matrix for the clear/cloud decision.
///
/// Cloud (label 1) is the positive class: a false positive is a clear sky
/// reported as cloudy. Rows of [`BinaryConfusion::matrix`] index the true
/// label, columns the predicted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryConfusion {
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_positives: usize,
}

impl BinaryConfusion {
    /// Threshold `scores` and tally against `truths`.
    pub fn from_scores(scores: &[f32], truths: &[f32], threshold: f32) -> Result<Self> {
        if scores.len() != truths.len() {
            return Err(Error::Dataset(format!(
                "{} scores but {} labels",
                scores.len(),
                truths.len()
            )));
        }
        if scores.is_empty() {
            return Err(Error::Dataset("no samples to score".to_string()));
        }

        let mut cm = Self {
            true_negatives: 0,
            false_positives: 0,
            false_negatives: 0,
            true_positives: 0,
        };
        for (&score, &truth) in scores.iter().zip(truths.iter()) {
            let predicted_cloud = score >= threshold;
            let is_cloud = truth >= 0.5;
            match (is_cloud, predicted_cloud) {
                (false, false) => cm.true_negatives += 1,
                (false, true) => cm.false_positives += 1,
                (true, false) => cm.false_negatives += 1,
                (true, true) => cm.true_positives += 1,
            }
        }
        Ok(cm)
    }

    pub fn total(&self) -> usize {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.true_negatives + self.true_positives) as f64 / total as f64
    }

    /// True instances of `class` (0 = clear, 1 = cloud).
    pub fn support(&self, class: usize) -> usize {
        if class == 0 {
            self.true_negatives + self.false_positives
        } else {
            self.false_negatives + self.true_positives
        }
    }

    /// One-vs-rest cell counts (tp, fp, fn) with `class` as the positive.
    fn cells(&self, class: usize) -> (f64, f64, f64) {
        if class == 0 {
            (
                self.true_negatives as f64,
                self.false_negatives as f64,
                self.false_positives as f64,
            )
        } else {
            (
                self.true_positives as f64,
                self.false_positives as f64,
                self.false_negatives as f64,
            )
        }
    }

    pub fn precision(&self, class: usize) -> f64 {
        let (tp, fp, _) = self.cells(class);
        if tp + fp > 0.0 {
            tp / (tp + fp)
        } else {
            0.0
        }
    }

    pub fn recall(&self, class: usize) -> f64 {
        let (tp, _, fn_) = self.cells(class);
        if tp + fn_ > 0.0 {
            tp / (tp + fn_)
        } else {
            0.0
        }
    }

    pub fn f1(&self, class: usize) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }

    /// Raw counts, `matrix()[true_label][predicted_label]`.
    pub fn matrix(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negatives, self.false_positives],
            [self.false_negatives, self.true_positives],
        ]
    }

    /// Each cell as a fraction of its row total (0 for an empty row).
    pub fn row_percentages(&self) -> [[f64; 2]; 2] {
        let matrix = self.matrix();
        let mut out = [[0.0; 2]; 2];
        for (row_idx, row) in matrix.iter().enumerate() {
            let row_total: usize = row.iter().sum();
            if row_total > 0 {
                for (col_idx, &cell) in row.iter().enumerate() {
                    out[row_idx][col_idx] = cell as f64 / row_total as f64;
                }
            }
        }
        out
    }
}
