//! ROC curve and AUC
//!
//! The curve is swept over the raw scores: thresholds are taken at every
//! distinct score value from high to low, tied scores move together, and
//! the area is integrated with the trapezoid rule. Both classes must be
//! present; a single-class split has no defined ROC and is a numerical
//! error rather than a silent degenerate curve.

use std::cmp::Ordering;

use crate::error::{Error, Result};

/// One operating point of the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocPoint {
    /// False positive rate
    pub fpr: f64,
    /// True positive rate
    pub tpr: f64,
}

/// Full sweep from (0, 0) to (1, 1) plus the integrated area.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    pub points: Vec<RocPoint>,
    pub auc: f64,
}

/// Compute the ROC curve of `scores` against binary `truths`.
pub fn roc_curve(scores: &[f32], truths: &[f32]) -> Result<RocCurve> {
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
    if scores.iter().any(|s| s.is_nan()) {
        return Err(Error::Numerical(
            "ROC input contains NaN scores".to_string(),
        ));
    }

    let positives = truths.iter().filter(|&&t| t >= 0.5).count();
    let negatives = truths.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(Error::Numerical(format!(
            "ROC needs both classes in the evaluation split ({positives} cloud, {negatives} clear)"
        )));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

    let mut points = vec![RocPoint { fpr: 0.0, tpr: 0.0 }];
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut i = 0;
    while i < order.len() {
        // advance through every sample tied at this score
        let score = scores[order[i]];
        while i < order.len() && scores[order[i]] == score {
            if truths[order[i]] >= 0.5 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(RocPoint {
            fpr: fp as f64 / negatives as f64,
            tpr: tp as f64 / positives as f64,
        });
    }

    let auc = points
        .windows(2)
        .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
        .sum();

    Ok(RocCurve { points, auc })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_interleaved_ranking_auc() {
        // sklearn: roc_auc_score([1, 0, 1, 0], [0.9, 0.8, 0.7, 0.6]) = 0.75
        let curve = roc_curve(&[0.9, 0.8, 0.7, 0.6], &[1.0, 0.0, 1.0, 0.0]).unwrap();
        assert!((curve.auc - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_ranking_auc_is_one() {
        let curve = roc_curve(&[0.9, 0.8, 0.2, 0.1], &[1.0, 1.0, 0.0, 0.0]).unwrap();
        assert!((curve.auc - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_ranking_auc_is_zero() {
        let curve = roc_curve(&[0.1, 0.2, 0.8, 0.9], &[1.0, 1.0, 0.0, 0.0]).unwrap();
        assert!(curve.auc.abs() < 1e-9);
    }

    #[test]
    fn test_constant_scores_auc_is_half() {
        // Every sample tied: one diagonal jump, chance-level area.
        let curve = roc_curve(&[0.5, 0.5, 0.5, 0.5], &[1.0, 0.0, 1.0, 0.0]).unwrap();
        assert!((curve.auc - 0.5).abs() < 1e-9);
        assert_eq!(curve.points.len(), 2);
    }

    #[test]
    fn test_endpoints_and_monotonicity() {
        let curve = roc_curve(
            &[0.95, 0.1, 0.8, 0.3, 0.6, 0.45],
            &[1.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        )
        .unwrap();

        let first = curve.points.first().unwrap();
        let last = curve.points.last().unwrap();
        assert_eq!((first.fpr, first.tpr), (0.0, 0.0));
        assert!((last.fpr - 1.0).abs() < 1e-9);
        assert!((last.tpr - 1.0).abs() < 1e-9);

        for pair in curve.points.windows(2) {
            assert!(pair[1].fpr >= pair[0].fpr);
            assert!(pair[1].tpr >= pair[0].tpr);
        }
    }

    #[test]
    fn test_single_class_is_numerical_error() {
        let err = roc_curve(&[0.9, 0.8], &[1.0, 1.0]).unwrap_err();
        assert_eq!(err.error_code(), "NBL-004");
        assert!(err.to_string().contains("both classes"));
    }

    #[test]
    fn test_nan_scores_rejected() {
        let err = roc_curve(&[f32::NAN, 0.5], &[1.0, 0.0]).unwrap_err();
        assert_eq!(err.error_code(), "NBL-004");
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(roc_curve(&[0.5], &[1.0, 0.0]).is_err());
    }
}
