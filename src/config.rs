//! Run configuration
//!
//! A run is fully described by one immutable [`RunConfig`], loaded from a
//! YAML file and optionally overridden field-by-field from the command line.
//! The struct is validated once at startup; the training core never
//! re-validates and never mutates it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::Normalize;
use crate::error::{Error, Result};
use crate::model::OptimizerKind;

/// Complete configuration for one training run.
///
/// All fields have defaults, so a minimal YAML file only needs the
/// data directory:
///
/// ```yaml
/// data_dir: /data/allsky/2024
/// dataset: lapalma
/// batch_size: 64
/// epochs: 100
/// ```
///
/// # Example
///
/// ```
/// use nublar::config::RunConfig;
///
/// let cfg = RunConfig {
///     dataset: "lapalma".into(),
///     batch_size: 64,
///     epochs: 100,
///     ..RunConfig::default()
/// };
/// assert_eq!(cfg.run_tag("logistic"), "lapalma_logistic_batch64_epoch100");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory of `<stem>.png` frames with `<stem>.json` label sidecars
    pub data_dir: PathBuf,

    /// Dataset name, used in the run tag and artifact filenames
    pub dataset: String,

    /// Directory that receives `checkpoints/` and `plots/`
    pub output_dir: PathBuf,

    /// Samples per batch
    pub batch_size: usize,

    /// Maximum number of epochs
    pub epochs: usize,

    /// Fraction of samples assigned to the training split, in (0, 1)
    pub train_fraction: f32,

    /// Optimizer used by the model
    pub optimizer: OptimizerKind,

    /// Momentum coefficient (SGD only)
    pub momentum: f32,

    /// Initial learning rate; the cosine schedule decays from here
    pub learning_rate: f32,

    /// Learning rate floor of the cosine schedule
    pub min_learning_rate: f32,

    /// Epochs without validation-loss improvement before stopping
    pub patience: usize,

    /// Minimum decrease of validation loss that counts as improvement
    pub min_delta: f32,

    /// Shuffle the training traversal each epoch
    pub shuffle: bool,

    /// Pixel normalization applied from training-split statistics
    pub normalize: Normalize,

    /// Seed for the split permutation, weight init, and epoch shuffles
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            dataset: "allsky".to_string(),
            output_dir: PathBuf::from("output"),
            batch_size: 32,
            epochs: 50,
            train_fraction: 0.8,
            optimizer: OptimizerKind::Sgd,
            momentum: 0.9,
            learning_rate: 1e-3,
            min_learning_rate: 1e-6,
            patience: 10,
            min_delta: 1e-9,
            shuffle: true,
            normalize: Normalize::Standard,
            seed: 42,
        }
    }
}

impl RunConfig {
    /// Load a configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| {
            Error::Serialization(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// Validate all field values. Called once at startup; every violation
    /// is a fatal configuration error.
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(Error::config(
                "data_dir",
                "<empty>",
                "set data_dir to the directory containing the frame files",
            ));
        }
        if self.dataset.is_empty() {
            return Err(Error::config(
                "dataset",
                "<empty>",
                "set dataset to a non-empty name; it prefixes all artifacts",
            ));
        }
        if self.batch_size == 0 {
            return Err(Error::config(
                "batch_size",
                self.batch_size,
                "batch_size must be at least 1",
            ));
        }
        if self.epochs == 0 {
            return Err(Error::config(
                "epochs",
                self.epochs,
                "epochs must be at least 1",
            ));
        }
        if !self.train_fraction.is_finite()
            || self.train_fraction <= 0.0
            || self.train_fraction >= 1.0
        {
            return Err(Error::config(
                "train_fraction",
                self.train_fraction,
                "train_fraction must lie strictly between 0 and 1",
            ));
        }
        if !self.momentum.is_finite() || !(0.0..1.0).contains(&self.momentum) {
            return Err(Error::config(
                "momentum",
                self.momentum,
                "momentum must lie in [0, 1)",
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Error::config(
                "learning_rate",
                self.learning_rate,
                "learning_rate must be a positive finite number",
            ));
        }
        if !self.min_learning_rate.is_finite()
            || self.min_learning_rate < 0.0
            || self.min_learning_rate > self.learning_rate
        {
            return Err(Error::config(
                "min_learning_rate",
                self.min_learning_rate,
                "min_learning_rate must lie in [0, learning_rate]",
            ));
        }
        if self.patience == 0 {
            return Err(Error::config(
                "patience",
                self.patience,
                "patience must be at least 1",
            ));
        }
        if !self.min_delta.is_finite() || self.min_delta < 0.0 {
            return Err(Error::config(
                "min_delta",
                self.min_delta,
                "min_delta must be a non-negative finite number",
            ));
        }
        Ok(())
    }

    /// Tag naming every artifact of this run, e.g.
    /// `lapalma_logistic_batch64_epoch100`.
    pub fn run_tag(&self, model_name: &str) -> String {
        format!(
            "{}_{}_batch{}_epoch{}",
            self.dataset, model_name, self.batch_size, self.epochs
        )
    }

    /// Directory holding the run's single checkpoint.
    pub fn checkpoint_dir(&self, model_name: &str) -> PathBuf {
        self.output_dir
            .join("checkpoints")
            .join(self.run_tag(model_name))
    }

    /// Path of the run's single checkpoint file (overwritten on each
    /// improvement; keep-best-only policy).
    pub fn checkpoint_path(&self, model_name: &str) -> PathBuf {
        self.checkpoint_dir(model_name).join("model.json")
    }

    /// Directory receiving plots and tabular reports.
    pub fn plots_dir(&self) -> PathBuf {
        self.output_dir.join("plots")
    }
}
