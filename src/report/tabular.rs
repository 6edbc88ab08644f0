//! Classification report CSV sink

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::eval::{BinaryConfusion, ClassificationReport, DECISION_THRESHOLD};

/// Threshold the scores, compute the full classification report, and write
/// it as `{tag}_report.csv`.
pub fn render_classification_report(
    scores: &[f32],
    truths: &[f32],
    out_dir: &Path,
    tag: &str,
) -> Result<PathBuf> {
    let confusion = BinaryConfusion::from_scores(scores, truths, DECISION_THRESHOLD)?;
    let report = ClassificationReport::from_confusion(&confusion);

    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!("{tag}_report.csv"));
    fs::write(&path, report.to_csv())?;
    Ok(path)
}
