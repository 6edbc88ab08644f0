//! Training loop, early stopping, and metric history
//!
//! # Example
//!
//! ```no_run
//! use nublar::config::RunConfig;
//! use nublar::cli::logging::LogLevel;
//! use nublar::data::{BatchSource, Dataset, Normalize, PixelStats, split_dataset};
//! use nublar::model::{LogisticModel, ModelSpec};
//! use nublar::train::Trainer;
//!
//! let config = RunConfig::from_yaml_file("run.yaml")?;
//! let dataset = Dataset::discover(&config.data_dir)?;
//! let split = split_dataset(&dataset.pairs, config.train_fraction, config.seed)?;
//! let stats = PixelStats::from_pairs(&split.train)?;
//!
//! let train = BatchSource::new(split.train, dataset.width, dataset.height,
//!     config.batch_size, config.normalize, stats, config.shuffle)?;
//! let val = BatchSource::new(split.test, dataset.width, dataset.height,
//!     config.batch_size, config.normalize, stats, false)?;
//!
//! let model = LogisticModel::new(&ModelSpec {
//!     features: dataset.features(),
//!     optimizer: config.optimizer,
//!     momentum: config.momentum,
//!     learning_rate: config.learning_rate,
//!     min_learning_rate: config.min_learning_rate,
//!     epochs: config.epochs,
//!     batches_per_epoch: train.num_batches(),
//!     seed: config.seed,
//! })?;
//!
//! let outcome = Trainer::new(&config, model, &train, &val,
//!     config.checkpoint_path("logistic"), LogLevel::Normal).run()?;
//! println!("best val_loss {:.4} at epoch {}", outcome.best_val_loss, outcome.best_epoch);
//! # Ok::<(), nublar::Error>(())
//! ```

mod early_stopping;
mod history;
mod trainer;

pub use early_stopping::EarlyStopping;
pub use history::TrainingHistory;
pub use trainer::{TrainOutcome, Trainer};
