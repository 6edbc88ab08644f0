//! Shared SVG scaffolding for the report sinks
//!
//! Charts are assembled as plain strings: deterministic output, no drawing
//! dependency, and the artifacts diff cleanly between runs. Every sink
//! draws on the same 800x500 canvas.

pub(crate) const CHART_WIDTH: f64 = 800.0;
pub(crate) const CHART_HEIGHT: f64 = 500.0;
pub(crate) const MARGIN_TOP: f64 = 60.0;
pub(crate) const MARGIN_RIGHT: f64 = 40.0;
pub(crate) const MARGIN_BOTTOM: f64 = 70.0;
pub(crate) const MARGIN_LEFT: f64 = 80.0;

pub(crate) const COLOR_TRAIN: &str = "#3498db";
pub(crate) const COLOR_VAL: &str = "#e74c3c";
pub(crate) const COLOR_ACCENT: &str = "#2ecc71";
pub(crate) const COLOR_CHANCE: &str = "#95a5a6";
pub(crate) const COLOR_GRID: &str = "#ecf0f1";
pub(crate) const COLOR_AXIS: &str = "#2c3e50";
pub(crate) const COLOR_TEXT: &str = "#2c3e50";

const FONT: &str = "Arial, sans-serif";

/// One polyline on an [`xy_chart`].
pub(crate) struct Series<'a> {
    pub label: &'a str,
    pub color: &'a str,
    pub points: Vec<(f64, f64)>,
    pub dashed: bool,
}

/// Render a line chart over the given series.
///
/// The x range always comes from the data; `y_range` pins the y axis when
/// the natural scale matters (accuracy and ROC sit on [0, 1]) and is
/// derived from the data otherwise.
pub(crate) fn xy_chart(
    title: &str,
    x_label: &str,
    y_label: &str,
    series: &[Series<'_>],
    y_range: Option<(f64, f64)>,
) -> String {
    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let (mut x_min, mut x_max, mut y_min, mut y_max) = data_ranges(series);
    if let Some((lo, hi)) = y_range {
        y_min = lo;
        y_max = hi;
    }
    // Flat data still needs a non-zero span to project onto.
    if x_max - x_min < f64::EPSILON {
        x_max = x_min + 1.0;
    }
    if y_max - y_min < f64::EPSILON {
        y_max = y_min + 1.0;
    }

    let to_x = |x: f64| MARGIN_LEFT + (x - x_min) / (x_max - x_min) * plot_width;
    let to_y = |y: f64| MARGIN_TOP + plot_height - (y - y_min) / (y_max - y_min) * plot_height;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}" width="{CHART_WIDTH}" height="{CHART_HEIGHT}">"#
    ));
    svg.push_str(&format!(
        r#"<rect width="{CHART_WIDTH}" height="{CHART_HEIGHT}" fill="white"/>"#
    ));

    svg.push_str(&format!(
        r#"<text x="{}" y="35" text-anchor="middle" font-family="{FONT}" font-size="18" font-weight="bold" fill="{COLOR_TEXT}">{}</text>"#,
        CHART_WIDTH / 2.0,
        escape_xml(title)
    ));

    // Grid and tick labels, five divisions each way
    for i in 0..=5 {
        let frac = f64::from(i) / 5.0;

        let y = MARGIN_TOP + plot_height - frac * plot_height;
        svg.push_str(&format!(
            r#"<line x1="{MARGIN_LEFT}" y1="{y}" x2="{}" y2="{y}" stroke="{COLOR_GRID}" stroke-width="1"/>"#,
            MARGIN_LEFT + plot_width
        ));
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="end" font-family="{FONT}" font-size="12" fill="{COLOR_TEXT}">{}</text>"#,
            MARGIN_LEFT - 10.0,
            y + 4.0,
            fmt_tick(y_min + frac * (y_max - y_min))
        ));

        let x = MARGIN_LEFT + frac * plot_width;
        svg.push_str(&format!(
            r#"<text x="{x}" y="{}" text-anchor="middle" font-family="{FONT}" font-size="12" fill="{COLOR_TEXT}">{}</text>"#,
            MARGIN_TOP + plot_height + 20.0,
            fmt_tick(x_min + frac * (x_max - x_min))
        ));
    }

    // Axes
    svg.push_str(&format!(
        r#"<line x1="{MARGIN_LEFT}" y1="{}" x2="{}" y2="{}" stroke="{COLOR_AXIS}" stroke-width="2"/>"#,
        MARGIN_TOP + plot_height,
        MARGIN_LEFT + plot_width,
        MARGIN_TOP + plot_height
    ));
    svg.push_str(&format!(
        r#"<line x1="{MARGIN_LEFT}" y1="{MARGIN_TOP}" x2="{MARGIN_LEFT}" y2="{}" stroke="{COLOR_AXIS}" stroke-width="2"/>"#,
        MARGIN_TOP + plot_height
    ));

    // Axis titles
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" font-family="{FONT}" font-size="14" fill="{COLOR_TEXT}">{}</text>"#,
        MARGIN_LEFT + plot_width / 2.0,
        CHART_HEIGHT - 15.0,
        escape_xml(x_label)
    ));
    svg.push_str(&format!(
        r#"<text x="20" y="{}" text-anchor="middle" font-family="{FONT}" font-size="14" fill="{COLOR_TEXT}" transform="rotate(-90 20 {})">{}</text>"#,
        CHART_HEIGHT / 2.0,
        CHART_HEIGHT / 2.0,
        escape_xml(y_label)
    ));

    // Series polylines
    for s in series {
        if s.points.is_empty() {
            continue;
        }
        let mut path = String::new();
        for (i, &(x, y)) in s.points.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            path.push_str(&format!("{cmd} {:.1} {:.1} ", to_x(x), to_y(y)));
        }
        let dash = if s.dashed {
            r#" stroke-dasharray="6 4""#
        } else {
            ""
        };
        svg.push_str(&format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="2.5"{dash}/>"#,
            path.trim_end(),
            s.color
        ));

        // Point markers clutter long runs
        if s.points.len() <= 30 && !s.dashed {
            for &(x, y) in &s.points {
                svg.push_str(&format!(
                    r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{}" stroke="white" stroke-width="1"/>"#,
                    to_x(x),
                    to_y(y),
                    s.color
                ));
            }
        }
    }

    // Legend, top right
    let mut legend_y = MARGIN_TOP + 12.0;
    for s in series {
        let legend_x = CHART_WIDTH - MARGIN_RIGHT - 180.0;
        let dash = if s.dashed {
            r#" stroke-dasharray="6 4""#
        } else {
            ""
        };
        svg.push_str(&format!(
            r#"<line x1="{legend_x}" y1="{legend_y}" x2="{}" y2="{legend_y}" stroke="{}" stroke-width="3"{dash}/>"#,
            legend_x + 24.0,
            s.color
        ));
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" font-family="{FONT}" font-size="12" fill="{COLOR_TEXT}">{}</text>"#,
            legend_x + 32.0,
            legend_y + 4.0,
            escape_xml(s.label)
        ));
        legend_y += 22.0;
    }

    svg.push_str("</svg>");
    svg
}

fn data_ranges(series: &[Series<'_>]) -> (f64, f64, f64, f64) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for s in series {
        for &(x, y) in &s.points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    (x_min, x_max, y_min, y_max)
}

/// Compact tick label: plain decimals in the readable range, scientific
/// notation outside it.
pub(crate) fn fmt_tick(value: f64) -> String {
    let abs = value.abs();
    if abs < 1e-12 {
        "0".to_string()
    } else if abs >= 1000.0 || abs < 0.01 {
        format!("{value:.1e}")
    } else if abs >= 10.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
