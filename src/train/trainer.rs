//! Epoch-driven training loop
//!
//! One [`Trainer`] run walks the full lifecycle: every epoch trains over a
//! freshly shuffled traversal of the training split, validates over the
//! held-out split, and checkpoints whenever the validation loss improves.
//! The single checkpoint file is overwritten in place, so the best state
//! is the only one kept. Training ends when the epoch budget is exhausted
//! or early stopping fires, after which the best checkpoint (never the
//! last epoch's state) is reloaded and scored over the validation split.
//!
//! Any error in any phase aborts the run; there are no retries and no
//! partially completed epochs in the history.

use std::path::PathBuf;
use std::time::Instant;

use ndarray::Array1;

use crate::cli::logging::{log, LogLevel};
use crate::config::RunConfig;
use crate::data::BatchSource;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::train::early_stopping::EarlyStopping;
use crate::train::history::{mean, TrainingHistory};

/// Everything a finished run leaves behind.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    /// Per-epoch aggregates for every completed epoch
    pub history: TrainingHistory,
    /// Best validation loss seen across the run
    pub best_val_loss: f32,
    /// 1-based epoch that wrote the surviving checkpoint
    pub best_epoch: usize,
    /// Epochs actually completed
    pub epochs_run: usize,
    /// Whether early stopping ended the run before the epoch budget
    pub stopped_early: bool,
    /// Checkpoint writes, one per improving epoch
    pub checkpoints_written: usize,
    /// Location of the surviving checkpoint
    pub checkpoint_path: PathBuf,
    /// Final-evaluation probabilities over the validation split
    pub scores: Array1<f32>,
    /// Ground-truth labels aligned with `scores`
    pub truths: Array1<f32>,
    /// Wall-clock duration of the run
    pub elapsed_secs: f64,
}

/// Drives a [`Model`] through training, validation, checkpointing, and
/// the final evaluation.
pub struct Trainer<'a, M: Model> {
    config: &'a RunConfig,
    model: M,
    train_source: &'a BatchSource,
    val_source: &'a BatchSource,
    stopper: EarlyStopping,
    history: TrainingHistory,
    checkpoint_path: PathBuf,
    level: LogLevel,
}

impl<'a, M: Model> Trainer<'a, M> {
    pub fn new(
        config: &'a RunConfig,
        model: M,
        train_source: &'a BatchSource,
        val_source: &'a BatchSource,
        checkpoint_path: PathBuf,
        level: LogLevel,
    ) -> Self {
        Self {
            config,
            model,
            train_source,
            val_source,
            stopper: EarlyStopping::new(config.patience, config.min_delta),
            history: TrainingHistory::new(),
            checkpoint_path,
            level,
        }
    }

    /// Run the full lifecycle and return the outcome.
    pub fn run(mut self) -> Result<TrainOutcome> {
        let start = Instant::now();
        let mut best_epoch = 0;
        let mut checkpoints_written = 0;
        let mut stopped_early = false;
        let mut epochs_run = 0;

        log(
            self.level,
            LogLevel::Normal,
            &format!(
                "Training {} for up to {} epochs ({} train / {} val samples, {} batches/epoch)",
                self.model.name(),
                self.config.epochs,
                self.train_source.num_samples(),
                self.val_source.num_samples(),
                self.train_source.num_batches()
            ),
        );

        for epoch in 1..=self.config.epochs {
            epochs_run = epoch;
            // A distinct shuffle per epoch, reproducible from the run seed
            let shuffle_seed = self.config.seed.wrapping_add(epoch as u64);

            let (train_loss, train_acc) = self.train_epoch(shuffle_seed)?;
            let (val_loss, val_acc) = self.validate_epoch()?;
            self.history.push_epoch(train_loss, train_acc, val_loss, val_acc);

            log(
                self.level,
                LogLevel::Normal,
                &format!(
                    "Epoch {epoch}/{} - train_loss: {train_loss:.4} - train_acc: {train_acc:.4} \
                     - val_loss: {val_loss:.4} - val_acc: {val_acc:.4} - lr: {:.3e}",
                    self.config.epochs,
                    self.model.learning_rate()
                ),
            );

            if self.stopper.update(val_loss) {
                if let Some(parent) = self.checkpoint_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                self.model.save(&self.checkpoint_path)?;
                checkpoints_written += 1;
                best_epoch = epoch;
                log(
                    self.level,
                    LogLevel::Verbose,
                    &format!(
                        "  val_loss improved to {val_loss:.6}, checkpoint saved to {}",
                        self.checkpoint_path.display()
                    ),
                );
            }

            if self.stopper.should_stop() {
                stopped_early = true;
                log(
                    self.level,
                    LogLevel::Normal,
                    &format!(
                        "Early stopping at epoch {epoch}: no improvement in {} epochs \
                         (best val_loss: {:.6})",
                        self.config.patience,
                        self.stopper.best_metric()
                    ),
                );
                break;
            }
        }

        let (scores, truths) = self.final_evaluation()?;

        Ok(TrainOutcome {
            history: self.history,
            best_val_loss: self.stopper.best_metric(),
            best_epoch,
            epochs_run,
            stopped_early,
            checkpoints_written,
            checkpoint_path: self.checkpoint_path,
            scores,
            truths,
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }

    /// One pass over the training split with parameter updates.
    fn train_epoch(&mut self, shuffle_seed: u64) -> Result<(f32, f32)> {
        let source = self.train_source;
        let mut losses = Vec::with_capacity(source.num_batches());
        let mut accuracies = Vec::with_capacity(source.num_batches());

        for batch in source.batches(shuffle_seed) {
            let stats = self.model.update(&batch?)?;
            losses.push(stats.loss);
            accuracies.push(stats.accuracy);
        }
        epoch_means(&losses, &accuracies, "training")
    }

    /// One read-only pass over the validation split.
    fn validate_epoch(&self) -> Result<(f32, f32)> {
        let mut losses = Vec::with_capacity(self.val_source.num_batches());
        let mut accuracies = Vec::with_capacity(self.val_source.num_batches());

        for batch in self.val_source.batches(0) {
            let stats = self.model.evaluate(&batch?)?;
            losses.push(stats.loss);
            accuracies.push(stats.accuracy);
        }
        epoch_means(&losses, &accuracies, "validation")
    }

    /// Reload the best checkpoint and score the validation split with it.
    fn final_evaluation(&self) -> Result<(Array1<f32>, Array1<f32>)> {
        if !self.checkpoint_path.is_file() {
            return Err(Error::Checkpoint(format!(
                "no checkpoint at {}; validation loss never improved during training",
                self.checkpoint_path.display()
            )));
        }
        log(
            self.level,
            LogLevel::Verbose,
            &format!(
                "Final evaluation using checkpoint {}",
                self.checkpoint_path.display()
            ),
        );

        let best = M::load(&self.checkpoint_path)?;
        let mut scores = Vec::with_capacity(self.val_source.num_samples());
        let mut truths = Vec::with_capacity(self.val_source.num_samples());

        for batch in self.val_source.batches(0) {
            let batch = batch?;
            let probs = best.predict(&batch)?;
            scores.extend(probs.iter().copied());
            truths.extend(batch.labels.iter().copied());
        }
        Ok((Array1::from(scores), Array1::from(truths)))
    }
}

/// Mean-aggregate the per-batch stats of one epoch phase.
fn epoch_means(losses: &[f32], accuracies: &[f32], phase: &str) -> Result<(f32, f32)> {
    let loss = mean(losses);
    let accuracy = mean(accuracies);
    if !loss.is_finite() || !accuracy.is_finite() {
        return Err(Error::Numerical(format!(
            "{phase} aggregates became non-finite (loss: {loss}, accuracy: {accuracy})"
        )));
    }
    Ok((loss, accuracy))
}
