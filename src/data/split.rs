//! Train/test splitting
//!
//! The split permutes the sample list with a seeded shuffle and slices off
//! the training prefix. The same seed always produces the same partition,
//! both sides are non-empty, and no pair appears on both sides.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::SamplePair;
use crate::error::{Error, Result};

/// Disjoint train/test partition of a dataset.
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    /// Training pairs
    pub train: Vec<SamplePair>,
    /// Held-out test pairs
    pub test: Vec<SamplePair>,
}

impl DatasetSplit {
    /// Total number of pairs across both sides.
    pub fn total(&self) -> usize {
        self.train.len() + self.test.len()
    }
}

/// Split `pairs` into train/test by `train_fraction`, deterministically for
/// a fixed `seed`.
///
/// The training side receives `round(N * train_fraction)` pairs, clamped so
/// that both sides keep at least one. Fewer than two pairs cannot be split.
pub fn split_dataset(
    pairs: &[SamplePair],
    train_fraction: f32,
    seed: u64,
) -> Result<DatasetSplit> {
    let n = pairs.len();
    if n < 2 {
        return Err(Error::Dataset(format!(
            "cannot split {n} sample(s) into train and test; need at least 2"
        )));
    }
    if !train_fraction.is_finite() || train_fraction <= 0.0 || train_fraction >= 1.0 {
        return Err(Error::config(
            "train_fraction",
            train_fraction,
            "train_fraction must lie strictly between 0 and 1",
        ));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_train = ((n as f32 * train_fraction).round() as usize).clamp(1, n - 1);

    let train = indices[..n_train].iter().map(|&i| pairs[i].clone()).collect();
    let test = indices[n_train..].iter().map(|&i| pairs[i].clone()).collect();

    Ok(DatasetSplit { train, test })
}
