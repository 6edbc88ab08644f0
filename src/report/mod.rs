//! Report sinks
//!
//! Each sink takes the final scores (or the training history), an output
//! directory, and the run tag, and writes one or more artifacts named
//! `{tag}_*.{svg,csv}`. Sinks create the output directory on demand and
//! return the paths they wrote so the caller can log them.
//!
//! All drawing is plain SVG string assembly (see [`svg`]); the CSV sinks
//! exist so results can be re-plotted or aggregated outside this crate.

mod confusion;
mod curves;
mod roc;
mod svg;
mod tabular;

pub use confusion::render_confusion_matrix;
pub use curves::render_loss_accuracy_curves;
pub use roc::render_roc;
pub use tabular::render_classification_report;
