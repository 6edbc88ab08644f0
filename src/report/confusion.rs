//! Confusion matrix heatmap

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::eval::{BinaryConfusion, CLASS_NAMES, DECISION_THRESHOLD};
use crate::report::svg::{escape_xml, CHART_HEIGHT, CHART_WIDTH, COLOR_AXIS, COLOR_TEXT};

const CELL: f64 = 150.0;
const GRID_LEFT: f64 = 280.0;
const GRID_TOP: f64 = 120.0;

/// Deepest heat cell, a saturated blue. Cells shade from white toward
/// this by their share of the true-class row.
const HEAT_HIGH: (u8, u8, u8) = (29, 78, 216);

/// Threshold the scores at 0.5, tally the confusion matrix, and write it
/// as a shaded 2x2 heatmap named `{tag}_confusion.svg`.
pub fn render_confusion_matrix(
    scores: &[f32],
    truths: &[f32],
    out_dir: &Path,
    tag: &str,
    title: &str,
) -> Result<PathBuf> {
    let confusion = BinaryConfusion::from_scores(scores, truths, DECISION_THRESHOLD)?;
    fs::create_dir_all(out_dir)?;

    let path = out_dir.join(format!("{tag}_confusion.svg"));
    fs::write(&path, draw_matrix(&confusion, title))?;
    Ok(path)
}

fn draw_matrix(confusion: &BinaryConfusion, title: &str) -> String {
    let counts = confusion.matrix();
    let shares = confusion.row_percentages();

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}" width="{CHART_WIDTH}" height="{CHART_HEIGHT}">"#
    ));
    svg.push_str(&format!(
        r#"<rect width="{CHART_WIDTH}" height="{CHART_HEIGHT}" fill="white"/>"#
    ));

    svg.push_str(&format!(
        r#"<text x="{}" y="45" text-anchor="middle" font-family="Arial, sans-serif" font-size="18" font-weight="bold" fill="{COLOR_TEXT}">{}</text>"#,
        CHART_WIDTH / 2.0,
        escape_xml(title)
    ));

    // Axis titles
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" font-family="Arial, sans-serif" font-size="14" fill="{COLOR_TEXT}">Predicted</text>"#,
        GRID_LEFT + CELL,
        GRID_TOP - 45.0
    ));
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" font-family="Arial, sans-serif" font-size="14" fill="{COLOR_TEXT}" transform="rotate(-90 {} {})">Actual</text>"#,
        GRID_LEFT - 110.0,
        GRID_TOP + CELL,
        GRID_LEFT - 110.0,
        GRID_TOP + CELL
    ));

    // Column and row class labels
    for (idx, name) in CLASS_NAMES.iter().enumerate() {
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="middle" font-family="Arial, sans-serif" font-size="13" fill="{COLOR_TEXT}">{name}</text>"#,
            GRID_LEFT + (idx as f64 + 0.5) * CELL,
            GRID_TOP - 15.0
        ));
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="end" font-family="Arial, sans-serif" font-size="13" fill="{COLOR_TEXT}">{name}</text>"#,
            GRID_LEFT - 15.0,
            GRID_TOP + (idx as f64 + 0.5) * CELL + 5.0
        ));
    }

    for row in 0..2 {
        for col in 0..2 {
            let x = GRID_LEFT + col as f64 * CELL;
            let y = GRID_TOP + row as f64 * CELL;
            let share = shares[row][col];

            svg.push_str(&format!(
                r#"<rect x="{x}" y="{y}" width="{CELL}" height="{CELL}" fill="{}" stroke="{COLOR_AXIS}" stroke-width="1"/>"#,
                heat_color(share)
            ));

            // Dark cells need light text
            let text_color = if share > 0.5 { "white" } else { COLOR_TEXT };
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" text-anchor="middle" font-family="Arial, sans-serif" font-size="24" font-weight="bold" fill="{text_color}">{}</text>"#,
                x + CELL / 2.0,
                y + CELL / 2.0,
                counts[row][col]
            ));
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" text-anchor="middle" font-family="Arial, sans-serif" font-size="13" fill="{text_color}">({:.1}%)</text>"#,
                x + CELL / 2.0,
                y + CELL / 2.0 + 26.0,
                share * 100.0
            ));
        }
    }

    svg.push_str("</svg>");
    svg
}

fn heat_color(share: f64) -> String {
    let frac = share.clamp(0.0, 1.0);
    let lerp =
        |to: u8| -> u8 { (255.0 + (f64::from(to) - 255.0) * frac).round().clamp(0.0, 255.0) as u8 };
    format!(
        "rgb({},{},{})",
        lerp(HEAT_HIGH.0),
        lerp(HEAT_HIGH.1),
        lerp(HEAT_HIGH.2)
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn parity_inputs() -> (Vec<f32>, Vec<f32>) {
        (
            vec![0.1, 0.9, 0.9, 0.1, 0.1, 0.9, 0.9, 0.9],
            vec![0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0],
        )
    }

    #[test]
    fn test_writes_tagged_heatmap() {
        let (scores, truths) = parity_inputs();
        let dir = tempfile::tempdir().unwrap();
        let path =
            render_confusion_matrix(&scores, &truths, dir.path(), "run7", "Confusion Matrix")
                .unwrap();

        assert!(path.ends_with("run7_confusion.svg"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<svg"));
        assert!(content.contains("clear"));
        assert!(content.contains("cloud"));
        assert!(content.contains("Predicted"));
        // tn=2 fp=2 row percentages of the clear row
        assert!(content.contains("(50.0%)"));
    }

    #[test]
    fn test_counts_appear_in_cells() {
        // tn=2 fp=2 fn=1 tp=3
        let (scores, truths) = parity_inputs();
        let dir = tempfile::tempdir().unwrap();
        let path = render_confusion_matrix(&scores, &truths, dir.path(), "t", "cm").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(">3</text>"));
        assert!(content.contains(">1</text>"));
    }

    #[test]
    fn test_mismatched_inputs_fail() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_confusion_matrix(&[0.5], &[1.0, 0.0], dir.path(), "t", "cm").unwrap_err();
        assert_eq!(err.error_code(), "NBL-003");
    }

    #[test]
    fn test_heat_color_endpoints() {
        assert_eq!(heat_color(0.0), "rgb(255,255,255)");
        assert_eq!(heat_color(1.0), "rgb(29,78,216)");
    }
}
