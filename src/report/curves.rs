//! Per-epoch loss and accuracy curves

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::report::svg::{self, Series, COLOR_TRAIN, COLOR_VAL};
use crate::train::TrainingHistory;

/// Floor applied before taking log10. A loss of exactly zero (perfectly
/// separated toy data) would otherwise project to negative infinity.
const LOG_FLOOR: f64 = 1e-12;

/// Render the per-epoch training curves into `out_dir`.
///
/// Three files are written, all keyed by `tag`:
/// - `{tag}_losses.svg`: train and validation loss on a linear scale
/// - `{tag}_log_losses.svg`: the same curves on a log10 scale, which keeps
///   late epochs readable after the loss has collapsed by orders of
///   magnitude
/// - `{tag}_acc.svg`: train and validation accuracy on a fixed [0, 1] axis
///
/// Returns the written paths in that order.
pub fn render_loss_accuracy_curves(
    history: &TrainingHistory,
    out_dir: &Path,
    tag: &str,
) -> Result<Vec<PathBuf>> {
    if history.is_empty() {
        return Err(Error::Dataset(
            "no epochs recorded, nothing to plot".to_string(),
        ));
    }
    fs::create_dir_all(out_dir)?;

    let with_epochs = |values: &[f32]| -> Vec<(f64, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| ((i + 1) as f64, f64::from(v)))
            .collect()
    };
    let log_scale = |points: Vec<(f64, f64)>| -> Vec<(f64, f64)> {
        points
            .into_iter()
            .map(|(x, y)| (x, y.max(LOG_FLOOR).log10()))
            .collect()
    };

    let mut written = Vec::with_capacity(3);

    let losses = svg::xy_chart(
        "Training and Validation Loss",
        "epoch",
        "loss",
        &[
            Series {
                label: "train loss",
                color: COLOR_TRAIN,
                points: with_epochs(&history.train_loss),
                dashed: false,
            },
            Series {
                label: "val loss",
                color: COLOR_VAL,
                points: with_epochs(&history.val_loss),
                dashed: false,
            },
        ],
        None,
    );
    let path = out_dir.join(format!("{tag}_losses.svg"));
    fs::write(&path, losses)?;
    written.push(path);

    let log_losses = svg::xy_chart(
        "Training and Validation Loss (log scale)",
        "epoch",
        "log10(loss)",
        &[
            Series {
                label: "train loss",
                color: COLOR_TRAIN,
                points: log_scale(with_epochs(&history.train_loss)),
                dashed: false,
            },
            Series {
                label: "val loss",
                color: COLOR_VAL,
                points: log_scale(with_epochs(&history.val_loss)),
                dashed: false,
            },
        ],
        None,
    );
    let path = out_dir.join(format!("{tag}_log_losses.svg"));
    fs::write(&path, log_losses)?;
    written.push(path);

    let accuracy = svg::xy_chart(
        "Training and Validation Accuracy",
        "epoch",
        "accuracy",
        &[
            Series {
                label: "train acc",
                color: COLOR_TRAIN,
                points: with_epochs(&history.train_accuracy),
                dashed: false,
            },
            Series {
                label: "val acc",
                color: COLOR_VAL,
                points: with_epochs(&history.val_accuracy),
                dashed: false,
            },
        ],
        Some((0.0, 1.0)),
    );
    let path = out_dir.join(format!("{tag}_acc.svg"));
    fs::write(&path, accuracy)?;
    written.push(path);

    Ok(written)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn three_epoch_history() -> TrainingHistory {
        let mut history = TrainingHistory::new();
        history.push_epoch(0.9, 0.55, 0.8, 0.6);
        history.push_epoch(0.5, 0.7, 0.45, 0.75);
        history.push_epoch(0.3, 0.85, 0.35, 0.8);
        history
    }

    #[test]
    fn test_writes_three_tagged_files() {
        let dir = tempfile::tempdir().unwrap();
        let written =
            render_loss_accuracy_curves(&three_epoch_history(), dir.path(), "allsky_run").unwrap();

        assert_eq!(written.len(), 3);
        assert!(written[0].ends_with("allsky_run_losses.svg"));
        assert!(written[1].ends_with("allsky_run_log_losses.svg"));
        assert!(written[2].ends_with("allsky_run_acc.svg"));
        for path in &written {
            let content = std::fs::read_to_string(path).unwrap();
            assert!(content.starts_with("<svg"), "{} is not SVG", path.display());
            assert!(content.contains("train"));
        }
    }

    #[test]
    fn test_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("reports").join("run1");
        let written = render_loss_accuracy_curves(&three_epoch_history(), &nested, "t").unwrap();
        assert!(written[0].is_file());
    }

    #[test]
    fn test_zero_loss_survives_log_scale() {
        let mut history = TrainingHistory::new();
        history.push_epoch(0.5, 0.5, 0.4, 0.5);
        history.push_epoch(0.0, 1.0, 0.0, 1.0);

        let dir = tempfile::tempdir().unwrap();
        let written = render_loss_accuracy_curves(&history, dir.path(), "t").unwrap();
        let log_chart = std::fs::read_to_string(&written[1]).unwrap();
        assert!(!log_chart.contains("NaN"));
        assert!(!log_chart.contains("-inf"));
    }

    #[test]
    fn test_empty_history_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            render_loss_accuracy_curves(&TrainingHistory::new(), dir.path(), "t").unwrap_err();
        assert_eq!(err.error_code(), "NBL-003");
    }
}
