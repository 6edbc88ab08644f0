//! Nublar: binary cloud screening for all-sky camera frames
//!
//! Trains a logistic classifier that labels each grayscale sky frame as
//! cloudy or clear. One immutable [`config::RunConfig`] describes a run
//! end to end: dataset discovery, a seeded train/test split, normalization
//! statistics computed from the training split only, mini-batch training
//! under a cosine learning-rate schedule, early stopping on validation
//! loss with a keep-best-only checkpoint, and a final evaluation that
//! reloads the best checkpoint and feeds every report.
//!
//! The training loop never sees a concrete classifier, only the
//! [`model::Model`] trait; see [`train::Trainer`] for the loop itself and
//! [`cli`] for the binary's entry points.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod eval;
pub mod model;
pub mod report;
pub mod train;

pub use config::RunConfig;
pub use error::{Error, Result};

// Convenience re-exports of the pipeline types
pub use data::{split_dataset, Batch, BatchSource, Dataset, DatasetSplit, Normalize, PixelStats};
pub use eval::{roc_curve, BinaryConfusion, ClassificationReport, RocCurve};
pub use model::{LogisticModel, Model, ModelSpec, OptimizerKind, StepStats};
pub use train::{EarlyStopping, TrainOutcome, Trainer, TrainingHistory};
