//! Dataset discovery, splitting, statistics, and batch production
//!
//! A dataset is a flat directory of grayscale PNG frames with JSON label
//! sidecars. The pipeline is: discover pairs → split train/test → compute
//! normalization statistics from the training split only → build one
//! [`BatchSource`] per split.

mod batch;
mod dataset;
mod loader;
mod split;
mod stats;

pub use batch::Batch;
pub use dataset::{Dataset, SamplePair, CLEAR, CLOUD};
pub use loader::{BatchSource, Batches, Normalize};
pub use split::{split_dataset, DatasetSplit};
pub use stats::PixelStats;
