//! Model interface
//!
//! The training loop only ever sees the [`Model`] trait: a trainable binary
//! classifier that can take a gradient step on a batch, score a batch
//! without learning, emit raw cloud probabilities, and round-trip itself
//! through a checkpoint file. Optimizer state, the learning-rate schedule,
//! and parameter initialization all live behind the trait, built in one
//! shot from a [`ModelSpec`].

mod logistic;
mod optim;
mod schedule;

pub use logistic::LogisticModel;
pub use optim::{OptimState, OptimizerKind};
pub use schedule::CosineSchedule;

use std::path::Path;

use ndarray::Array1;

use crate::data::Batch;
use crate::error::Result;

/// Everything needed to construct a model together with its optimizer
/// state and learning-rate schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    /// Input width: pixels per flattened frame
    pub features: usize,
    /// Optimizer family to attach
    pub optimizer: OptimizerKind,
    /// Momentum coefficient (SGD only; ignored by Adam)
    pub momentum: f32,
    /// Peak learning rate at schedule start
    pub learning_rate: f32,
    /// Floor the cosine schedule decays to
    pub min_learning_rate: f32,
    /// Planned epochs, used to size the schedule
    pub epochs: usize,
    /// Update steps per epoch, used to size the schedule
    pub batches_per_epoch: usize,
    /// Seed for parameter initialization
    pub seed: u64,
}

impl ModelSpec {
    /// Total update steps the schedule must span.
    pub fn total_steps(&self) -> usize {
        self.epochs * self.batches_per_epoch
    }
}

/// Loss and accuracy measured over one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepStats {
    pub loss: f32,
    pub accuracy: f32,
}

/// Trait for trainable binary classifiers.
///
/// Labels are `0.0` (clear) and `1.0` (cloud); predictions are raw
/// probabilities of the positive class. Implementations own their
/// optimizer state and learning-rate schedule, so `update` advances both.
pub trait Model: Sized {
    /// Take one gradient step on `batch`, returning pre-update loss and accuracy
    fn update(&mut self, batch: &Batch) -> Result<StepStats>;

    /// Score `batch` without changing any state
    fn evaluate(&self, batch: &Batch) -> Result<StepStats>;

    /// Raw probability of the positive class for every row of `batch`
    fn predict(&self, batch: &Batch) -> Result<Array1<f32>>;

    /// Learning rate the next update will use
    fn learning_rate(&self) -> f32;

    /// Short stable identifier, used in run tags and checkpoint metadata
    fn name(&self) -> &'static str;

    /// Persist parameters, optimizer state, and schedule position to `path`
    fn save(&self, path: &Path) -> Result<()>;

    /// Restore a model previously written by [`Model::save`]
    fn load(path: &Path) -> Result<Self>;
}
