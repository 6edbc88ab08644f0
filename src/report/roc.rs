//! ROC curve chart and optional raw-point CSV

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::eval::roc_curve;
use crate::report::svg::{self, Series, COLOR_ACCENT, COLOR_CHANCE};

/// Sweep the ROC curve over the scores and write `{tag}_roc.svg`, with the
/// AUC in the legend and the chance diagonal dashed for reference.
///
/// With `with_csv` set, the raw operating points are also written to
/// `{tag}_roc.csv` as `fpr,tpr` rows so the curve can be replotted
/// elsewhere. Returns the written paths, SVG first.
pub fn render_roc(
    scores: &[f32],
    truths: &[f32],
    out_dir: &Path,
    tag: &str,
    with_csv: bool,
) -> Result<Vec<PathBuf>> {
    let curve = roc_curve(scores, truths)?;
    fs::create_dir_all(out_dir)?;

    let auc_label = format!("ROC (AUC = {:.4})", curve.auc);
    let chart = svg::xy_chart(
        "Receiver Operating Characteristic",
        "false positive rate",
        "true positive rate",
        &[
            Series {
                label: "chance",
                color: COLOR_CHANCE,
                points: vec![(0.0, 0.0), (1.0, 1.0)],
                dashed: true,
            },
            Series {
                label: &auc_label,
                color: COLOR_ACCENT,
                points: curve.points.iter().map(|p| (p.fpr, p.tpr)).collect(),
                dashed: false,
            },
        ],
        Some((0.0, 1.0)),
    );

    let mut written = Vec::with_capacity(2);
    let svg_path = out_dir.join(format!("{tag}_roc.svg"));
    fs::write(&svg_path, chart)?;
    written.push(svg_path);

    if with_csv {
        let mut csv = String::from("fpr,tpr\n");
        for point in &curve.points {
            // infallible on String
            let _ = writeln!(csv, "{:.6},{:.6}", point.fpr, point.tpr);
        }
        let csv_path = out_dir.join(format!("{tag}_roc.csv"));
        fs::write(&csv_path, csv)?;
        written.push(csv_path);
    }

    Ok(written)
}
