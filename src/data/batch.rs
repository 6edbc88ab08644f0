//! Batch type shared by training and evaluation

use ndarray::{Array1, Array2};

/// A batch of flattened frames and their labels.
///
/// `images` has one row per sample (`batch_size x features`); `labels`
/// holds the matching [`crate::data::CLEAR`]/[`crate::data::CLOUD`]
/// values. The leading dimensions always agree.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Flattened pixel rows, one per sample
    pub images: Array2<f32>,
    /// Label per sample, index-aligned with `images`
    pub labels: Array1<f32>,
}

impl Batch {
    /// Create a batch. The row count of `images` must equal the length of
    /// `labels`; this is an internal invariant of the batch source.
    pub fn new(images: Array2<f32>, labels: Array1<f32>) -> Self {
        debug_assert_eq!(images.nrows(), labels.len());
        Self { images, labels }
    }

    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when the batch holds no samples.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
