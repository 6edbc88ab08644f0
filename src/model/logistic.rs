//! Logistic regression on flattened frames
//!
//! One weight per pixel plus a bias, trained with binary cross-entropy on
//! logits. The loss uses the numerically stable form
//!
//! BCE(x, t) = max(x, 0) - x * t + ln(1 + exp(-|x|))
//!
//! which never overflows for large |x|. Checkpoints are JSON documents
//! carrying parameters, optimizer buffers, and the schedule position, so
//! a reloaded model continues exactly where the saved one stopped.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::Batch;
use crate::error::{Error, Result};
use crate::model::optim::OptimState;
use crate::model::schedule::CosineSchedule;
use crate::model::{Model, ModelSpec, StepStats};

const CHECKPOINT_VERSION: u32 = 1;
const MODEL_NAME: &str = "logistic";
const INIT_SCALE: f32 = 0.01;

/// Binary logistic regression classifier.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    weights: Array1<f32>,
    bias: f32,
    momentum: f32,
    optim: OptimState,
    schedule: CosineSchedule,
}

/// On-disk checkpoint layout. Arrays are stored as plain vectors to keep
/// the JSON readable and independent of the in-memory representation.
#[derive(Debug, Serialize, Deserialize)]
struct CheckpointFile {
    format_version: u32,
    model: String,
    saved_at: DateTime<Utc>,
    features: usize,
    weights: Vec<f32>,
    bias: f32,
    momentum: f32,
    optimizer: SavedOptim,
    schedule: CosineSchedule,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum SavedOptim {
    Sgd {
        vel_w: Vec<f32>,
        vel_b: f32,
    },
    Adam {
        m_w: Vec<f32>,
        v_w: Vec<f32>,
        m_b: f32,
        v_b: f32,
        t: u64,
    },
}

impl From<&OptimState> for SavedOptim {
    fn from(state: &OptimState) -> Self {
        match state {
            OptimState::Sgd { vel_w, vel_b } => SavedOptim::Sgd {
                vel_w: vel_w.to_vec(),
                vel_b: *vel_b,
            },
            OptimState::Adam { m_w, v_w, m_b, v_b, t } => SavedOptim::Adam {
                m_w: m_w.to_vec(),
                v_w: v_w.to_vec(),
                m_b: *m_b,
                v_b: *v_b,
                t: *t,
            },
        }
    }
}

impl SavedOptim {
    fn into_state(self, features: usize) -> Result<OptimState> {
        let state = match self {
            SavedOptim::Sgd { vel_w, vel_b } => OptimState::Sgd {
                vel_w: Array1::from(vel_w),
                vel_b,
            },
            SavedOptim::Adam { m_w, v_w, m_b, v_b, t } => OptimState::Adam {
                m_w: Array1::from(m_w),
                v_w: Array1::from(v_w),
                m_b,
                v_b,
                t,
            },
        };
        let buffer_len = match &state {
            OptimState::Sgd { vel_w, .. } => vel_w.len(),
            OptimState::Adam { m_w, .. } => m_w.len(),
        };
        if buffer_len != features {
            return Err(Error::Checkpoint(format!(
                "optimizer buffers hold {buffer_len} values but the model has {features} features"
            )));
        }
        Ok(state)
    }
}

/// Sigmoid without overflow for large negative inputs.
fn stable_sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Mean binary cross-entropy computed directly on logits.
fn bce_with_logits(logits: &Array1<f32>, labels: &Array1<f32>) -> f32 {
    let total: f32 = logits
        .iter()
        .zip(labels.iter())
        .map(|(&x, &t)| x.max(0.0) - x * t + (1.0 + (-x.abs()).exp()).ln())
        .sum();
    total / logits.len() as f32
}

/// Fraction of rows where the thresholded probability matches the label.
fn accuracy(probs: &Array1<f32>, labels: &Array1<f32>) -> f32 {
    let correct = probs
        .iter()
        .zip(labels.iter())
        .filter(|&(&p, &t)| (p >= 0.5) == (t >= 0.5))
        .count();
    correct as f32 / probs.len() as f32
}

impl LogisticModel {
    /// Build a fresh model with seeded uniform init in `[-0.01, 0.01)`.
    pub fn new(spec: &ModelSpec) -> Result<Self> {
        if spec.features == 0 {
            return Err(Error::config(
                "features",
                spec.features,
                "the model needs at least one input feature",
            ));
        }
        let mut rng = StdRng::seed_from_u64(spec.seed);
        let weights =
            Array1::from_shape_fn(spec.features, |_| rng.gen_range(-INIT_SCALE..INIT_SCALE));

        Ok(Self {
            weights,
            bias: 0.0,
            momentum: spec.momentum,
            optim: OptimState::new(spec.optimizer, spec.features),
            schedule: CosineSchedule::new(
                spec.learning_rate,
                spec.total_steps(),
                spec.min_learning_rate,
            ),
        })
    }

    pub fn num_features(&self) -> usize {
        self.weights.len()
    }

    fn logits(&self, batch: &Batch) -> Array1<f32> {
        batch.images.dot(&self.weights) + self.bias
    }

    fn step_stats(&self, logits: &Array1<f32>, labels: &Array1<f32>) -> Result<StepStats> {
        let loss = bce_with_logits(logits, labels);
        if !loss.is_finite() {
            return Err(Error::Numerical(format!(
                "loss became non-finite ({loss}); inputs or learning rate are out of range"
            )));
        }
        let probs = logits.mapv(stable_sigmoid);
        Ok(StepStats {
            loss,
            accuracy: accuracy(&probs, labels),
        })
    }
}

impl Model for LogisticModel {
    fn update(&mut self, batch: &Batch) -> Result<StepStats> {
        if batch.is_empty() {
            return Err(Error::Dataset("cannot train on an empty batch".to_string()));
        }
        let logits = self.logits(batch);
        let stats = self.step_stats(&logits, &batch.labels)?;

        let n = batch.len() as f32;
        let probs = logits.mapv(stable_sigmoid);
        let dlogit = (&probs - &batch.labels) / n;
        let grad_w = batch.images.t().dot(&dlogit);
        let grad_b = dlogit.sum();

        let lr = self.schedule.get_lr();
        self.optim
            .apply(&mut self.weights, &mut self.bias, &grad_w, grad_b, lr, self.momentum);
        self.schedule.step();

        Ok(stats)
    }

    fn evaluate(&self, batch: &Batch) -> Result<StepStats> {
        if batch.is_empty() {
            return Err(Error::Dataset("cannot evaluate an empty batch".to_string()));
        }
        let logits = self.logits(batch);
        self.step_stats(&logits, &batch.labels)
    }

    fn predict(&self, batch: &Batch) -> Result<Array1<f32>> {
        let probs = self.logits(batch).mapv(stable_sigmoid);
        if probs.iter().any(|p| !p.is_finite()) {
            return Err(Error::Numerical(
                "prediction produced non-finite probabilities".to_string(),
            ));
        }
        Ok(probs)
    }

    fn learning_rate(&self) -> f32 {
        self.schedule.get_lr()
    }

    fn name(&self) -> &'static str {
        MODEL_NAME
    }

    fn save(&self, path: &Path) -> Result<()> {
        let file = CheckpointFile {
            format_version: CHECKPOINT_VERSION,
            model: MODEL_NAME.to_string(),
            saved_at: Utc::now(),
            features: self.weights.len(),
            weights: self.weights.to_vec(),
            bias: self.bias,
            momentum: self.momentum,
            optimizer: SavedOptim::from(&self.optim),
            schedule: self.schedule,
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| Error::Serialization(format!("checkpoint encoding failed: {e}")))?;
        fs::write(path, json)?;
        Ok(())
    }

    fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let file: CheckpointFile = serde_json::from_str(&json).map_err(|e| {
            Error::Serialization(format!("{} is not a valid checkpoint: {e}", path.display()))
        })?;

        if file.format_version != CHECKPOINT_VERSION {
            return Err(Error::Checkpoint(format!(
                "unsupported checkpoint version {} (this build reads version {})",
                file.format_version, CHECKPOINT_VERSION
            )));
        }
        if file.model != MODEL_NAME {
            return Err(Error::Checkpoint(format!(
                "checkpoint holds a '{}' model, expected '{MODEL_NAME}'",
                file.model
            )));
        }
        if file.weights.len() != file.features {
            return Err(Error::Checkpoint(format!(
                "checkpoint declares {} features but stores {} weights",
                file.features,
                file.weights.len()
            )));
        }

        let optim = file.optimizer.into_state(file.features)?;
        Ok(Self {
            weights: Array1::from(file.weights),
            bias: file.bias,
            momentum: file.momentum,
            optim,
            schedule: file.schedule,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::model::OptimizerKind;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};
    use tempfile::tempdir;

    fn spec(optimizer: OptimizerKind, epochs: usize, lr: f32) -> ModelSpec {
        ModelSpec {
            features: 2,
            optimizer,
            momentum: 0.9,
            learning_rate: lr,
            min_learning_rate: 1e-4,
            epochs,
            batches_per_epoch: 1,
            seed: 42,
        }
    }

    /// Two well separated clusters: clear frames are dark, cloud frames bright.
    fn separable_batch() -> Batch {
        let images = arr2(&[
            [0.10, 0.20],
            [0.15, 0.10],
            [0.05, 0.25],
            [0.20, 0.15],
            [0.90, 0.80],
            [0.85, 0.95],
            [0.95, 0.75],
            [0.80, 0.90],
        ]);
        let labels = arr1(&[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
        Batch::new(images, labels)
    }

    #[test]
    fn test_fresh_model_loss_near_ln2() {
        // Near-zero init puts every logit near 0, so BCE starts at ~ln 2.
        let model = LogisticModel::new(&spec(OptimizerKind::Sgd, 10, 0.1)).unwrap();
        let stats = model.evaluate(&separable_batch()).unwrap();
        assert_relative_eq!(stats.loss, std::f32::consts::LN_2, epsilon = 0.02);
    }

    #[test]
    fn test_update_reports_pre_step_stats() {
        let mut model = LogisticModel::new(&spec(OptimizerKind::Sgd, 10, 0.5)).unwrap();
        let batch = separable_batch();
        let before = model.evaluate(&batch).unwrap();
        let reported = model.update(&batch).unwrap();
        assert_relative_eq!(reported.loss, before.loss, epsilon = 1e-7);
    }

    #[test]
    fn test_sgd_converges_on_separable_data() {
        let mut model = LogisticModel::new(&spec(OptimizerKind::Sgd, 300, 0.5)).unwrap();
        let batch = separable_batch();
        for _ in 0..300 {
            model.update(&batch).unwrap();
        }
        let stats = model.evaluate(&batch).unwrap();
        assert!(stats.loss < 0.3, "loss {} did not fall", stats.loss);
        assert_relative_eq!(stats.accuracy, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_adam_converges_on_separable_data() {
        let mut model = LogisticModel::new(&spec(OptimizerKind::Adam, 300, 0.05)).unwrap();
        let batch = separable_batch();
        for _ in 0..300 {
            model.update(&batch).unwrap();
        }
        let stats = model.evaluate(&batch).unwrap();
        assert!(stats.loss < 0.3, "loss {} did not fall", stats.loss);
        assert_relative_eq!(stats.accuracy, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_evaluate_does_not_advance_schedule() {
        let model = LogisticModel::new(&spec(OptimizerKind::Sgd, 10, 0.1)).unwrap();
        let batch = separable_batch();
        let lr_before = model.learning_rate();
        model.evaluate(&batch).unwrap();
        model.evaluate(&batch).unwrap();
        assert_relative_eq!(model.learning_rate(), lr_before, epsilon = 1e-9);
    }

    #[test]
    fn test_learning_rate_decays_across_updates() {
        let mut model = LogisticModel::new(&spec(OptimizerKind::Sgd, 50, 0.1)).unwrap();
        let batch = separable_batch();
        let lr0 = model.learning_rate();
        for _ in 0..25 {
            model.update(&batch).unwrap();
        }
        assert!(model.learning_rate() < lr0);
    }

    #[test]
    fn test_predict_yields_probabilities() {
        let mut model = LogisticModel::new(&spec(OptimizerKind::Sgd, 100, 0.5)).unwrap();
        let batch = separable_batch();
        for _ in 0..100 {
            model.update(&batch).unwrap();
        }
        let probs = model.predict(&batch).unwrap();
        for &p in &probs {
            assert!((0.0..=1.0).contains(&p));
        }
        // bright rows must score higher than dark rows after training
        assert!(probs[4] > probs[0]);
    }

    #[test]
    fn test_init_is_seed_deterministic() {
        let a = LogisticModel::new(&spec(OptimizerKind::Sgd, 10, 0.1)).unwrap();
        let b = LogisticModel::new(&spec(OptimizerKind::Sgd, 10, 0.1)).unwrap();
        assert_eq!(a.weights, b.weights);

        let mut other = spec(OptimizerKind::Sgd, 10, 0.1);
        other.seed = 7;
        let c = LogisticModel::new(&other).unwrap();
        assert_ne!(a.weights, c.weights);
    }

    #[test]
    fn test_non_finite_input_is_numerical_error() {
        let model = LogisticModel::new(&spec(OptimizerKind::Sgd, 10, 0.1)).unwrap();
        let batch = Batch::new(
            arr2(&[[f32::INFINITY, 0.0], [0.0, 0.0]]),
            arr1(&[1.0, 0.0]),
        );
        let err = model.evaluate(&batch).unwrap_err();
        assert_eq!(err.error_code(), "NBL-004");
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        let batch = separable_batch();

        let mut model = LogisticModel::new(&spec(OptimizerKind::Adam, 50, 0.05)).unwrap();
        for _ in 0..10 {
            model.update(&batch).unwrap();
        }
        model.save(&path).unwrap();

        let restored = LogisticModel::load(&path).unwrap();
        assert_eq!(
            model.predict(&batch).unwrap().to_vec(),
            restored.predict(&batch).unwrap().to_vec()
        );
        assert_relative_eq!(model.learning_rate(), restored.learning_rate(), epsilon = 1e-9);
    }

    #[test]
    fn test_restored_model_trains_identically() {
        // Optimizer buffers and schedule position must survive the round
        // trip: continuing either copy produces identical parameters.
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        let batch = separable_batch();

        let mut original = LogisticModel::new(&spec(OptimizerKind::Sgd, 50, 0.2)).unwrap();
        for _ in 0..5 {
            original.update(&batch).unwrap();
        }
        original.save(&path).unwrap();
        let mut restored = LogisticModel::load(&path).unwrap();

        original.update(&batch).unwrap();
        restored.update(&batch).unwrap();
        assert_eq!(
            original.predict(&batch).unwrap().to_vec(),
            restored.predict(&batch).unwrap().to_vec()
        );
    }

    #[test]
    fn test_load_rejects_future_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = LogisticModel::new(&spec(OptimizerKind::Sgd, 10, 0.1)).unwrap();
        model.save(&path).unwrap();

        let doctored = std::fs::read_to_string(&path)
            .unwrap()
            .replace("\"format_version\": 1", "\"format_version\": 99");
        std::fs::write(&path, doctored).unwrap();

        let err = LogisticModel::load(&path).unwrap_err();
        assert_eq!(err.error_code(), "NBL-005");
        assert!(err.to_string().contains("version 99"));
    }

    #[test]
    fn test_load_rejects_foreign_model() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = LogisticModel::new(&spec(OptimizerKind::Sgd, 10, 0.1)).unwrap();
        model.save(&path).unwrap();

        let doctored = std::fs::read_to_string(&path)
            .unwrap()
            .replace("\"model\": \"logistic\"", "\"model\": \"mlp\"");
        std::fs::write(&path, doctored).unwrap();

        assert!(LogisticModel::load(&path).is_err());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{ not a checkpoint").unwrap();
        let err = LogisticModel::load(&path).unwrap_err();
        assert_eq!(err.error_code(), "NBL-006");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        assert!(LogisticModel::load(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_stable_sigmoid_extremes() {
        assert_relative_eq!(stable_sigmoid(0.0), 0.5, epsilon = 1e-7);
        assert_relative_eq!(stable_sigmoid(100.0), 1.0, epsilon = 1e-6);
        assert_relative_eq!(stable_sigmoid(-100.0), 0.0, epsilon = 1e-6);
        assert!(stable_sigmoid(1e30).is_finite());
        assert!(stable_sigmoid(-1e30).is_finite());
    }

    #[test]
    fn test_bce_matches_hand_computation() {
        // Single logit x = 0, t = 1: loss = ln 2
        let loss = bce_with_logits(&arr1(&[0.0]), &arr1(&[1.0]));
        assert_relative_eq!(loss, std::f32::consts::LN_2, epsilon = 1e-6);

        // Large positive logit with t = 1 costs ~0
        let loss = bce_with_logits(&arr1(&[50.0]), &arr1(&[1.0]));
        assert!(loss < 1e-6);

        // Large positive logit with t = 0 costs ~x
        let loss = bce_with_logits(&arr1(&[50.0]), &arr1(&[0.0]));
        assert_relative_eq!(loss, 50.0, epsilon = 1e-3);
    }
}
