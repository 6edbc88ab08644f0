//! Batch production
//!
//! A [`BatchSource`] owns an ordered collection of sample pairs and yields
//! lazy, finite, restartable traversals over them. Each traversal covers
//! every sample exactly once in `ceil(N / B)` batches; only the last batch
//! may be short. Files are decoded on demand, one batch at a time, and the
//! configured normalization is applied element-wise from statistics that
//! were computed on the training split.
//!
//! The source keeps no cross-traversal state: a fresh call to
//! [`BatchSource::batches`] starts an independent sequence. When shuffling
//! is enabled the traversal order is drawn once per call from the given
//! seed, so a fixed seed reproduces the exact order.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::data::dataset::read_label;
use crate::data::stats::decode_gray;
use crate::data::{Batch, PixelStats, SamplePair};
use crate::error::{Error, Result};

/// Pixel normalization applied during batch assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalize {
    /// Leave raw pixel values untouched
    Off,
    /// Standardize: `(x - mean) / std`
    #[default]
    Standard,
    /// Scale to `[0, 1]`: `(x - min) / (max - min)`
    MinMax,
}

/// Lazy batch producer over one dataset split.
///
/// # Example
///
/// ```no_run
/// use nublar::data::{BatchSource, Dataset, Normalize, PixelStats};
///
/// let dataset = Dataset::discover("frames/")?;
/// let stats = PixelStats::from_pairs(&dataset.pairs)?;
/// let source = BatchSource::new(
///     dataset.pairs.clone(),
///     dataset.width,
///     dataset.height,
///     32,
///     Normalize::Standard,
///     stats,
///     true,
/// )?;
/// for batch in source.batches(42) {
///     let batch = batch?;
///     println!("batch of {}", batch.len());
/// }
/// # Ok::<(), nublar::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct BatchSource {
    pairs: Vec<SamplePair>,
    width: u32,
    height: u32,
    batch_size: usize,
    normalize: Normalize,
    stats: PixelStats,
    shuffle: bool,
}

impl BatchSource {
    /// Create a batch source over `pairs`.
    ///
    /// Fails fast on an empty collection, a zero batch size, or statistics
    /// that cannot support the selected normalization (zero standard
    /// deviation for [`Normalize::Standard`], zero range for
    /// [`Normalize::MinMax`]).
    pub fn new(
        pairs: Vec<SamplePair>,
        width: u32,
        height: u32,
        batch_size: usize,
        normalize: Normalize,
        stats: PixelStats,
        shuffle: bool,
    ) -> Result<Self> {
        if pairs.is_empty() {
            return Err(Error::Dataset(
                "batch source needs at least one sample pair".to_string(),
            ));
        }
        if batch_size == 0 {
            return Err(Error::config(
                "batch_size",
                batch_size,
                "batch_size must be at least 1",
            ));
        }
        match normalize {
            Normalize::Standard if stats.std <= 0.0 => {
                return Err(Error::Numerical(format!(
                    "standardization needs std > 0, got {} (all training pixels identical?)",
                    stats.std
                )));
            }
            Normalize::MinMax if stats.range() <= 0.0 => {
                return Err(Error::Numerical(format!(
                    "min-max scaling needs max > min, got range {}",
                    stats.range()
                )));
            }
            _ => {}
        }
        Ok(Self {
            pairs,
            width,
            height,
            batch_size,
            normalize,
            stats,
            shuffle,
        })
    }

    /// Number of samples covered by one traversal.
    pub fn num_samples(&self) -> usize {
        self.pairs.len()
    }

    /// Number of batches per traversal: `ceil(N / B)`.
    pub fn num_batches(&self) -> usize {
        (self.pairs.len() + self.batch_size - 1) / self.batch_size
    }

    /// Pixels per sample row.
    pub fn features(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Start a fresh traversal.
    ///
    /// With shuffling enabled the order is a permutation drawn from an RNG
    /// seeded with `seed`; without it the order is the stable sorted order
    /// of the pairs and `seed` is ignored.
    pub fn batches(&self, seed: u64) -> Batches<'_> {
        let mut order: Vec<usize> = (0..self.pairs.len()).collect();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(seed);
            order.shuffle(&mut rng);
        }
        Batches {
            source: self,
            order,
            cursor: 0,
            failed: false,
        }
    }

    /// Decode and assemble the samples at `indices` into one batch.
    fn load_batch(&self, indices: &[usize]) -> Result<Batch> {
        let features = self.features();
        let mut pixels = Vec::with_capacity(indices.len() * features);
        let mut labels = Vec::with_capacity(indices.len());

        for &idx in indices {
            let pair = &self.pairs[idx];
            let gray = decode_gray(&pair.image)?;
            let (w, h) = gray.dimensions();
            if (w, h) != (self.width, self.height) {
                return Err(Error::data(
                    &pair.image,
                    format!(
                        "frame is {w}x{h} but the dataset is {}x{}",
                        self.width, self.height
                    ),
                    "all frames in a dataset must share the same dimensions",
                ));
            }
            pixels.extend(gray.as_raw().iter().map(|&px| f32::from(px)));
            labels.push(read_label(&pair.label)?);
        }

        let mut images = Array2::from_shape_vec((indices.len(), features), pixels)
            .map_err(|e| Error::Dataset(format!("batch assembly failed: {e}")))?;

        match self.normalize {
            Normalize::Off => {}
            Normalize::Standard => {
                let (mean, std) = (self.stats.mean, self.stats.std);
                images.mapv_inplace(|v| (v - mean) / std);
            }
            Normalize::MinMax => {
                let (min, range) = (self.stats.min, self.stats.range());
                images.mapv_inplace(|v| (v - min) / range);
            }
        }

        Ok(Batch::new(images, Array1::from(labels)))
    }
}

/// One lazy traversal over a [`BatchSource`].
///
/// Yields `Err` at most once: a decode failure is fatal to the run, so the
/// iterator fuses after reporting it.
pub struct Batches<'a> {
    source: &'a BatchSource,
    order: Vec<usize>,
    cursor: usize,
    failed: bool,
}

impl Iterator for Batches<'_> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let start = self.cursor * self.source.batch_size;
        if start >= self.order.len() {
            return None;
        }
        let end = (start + self.source.batch_size).min(self.order.len());
        self.cursor += 1;

        match self.source.load_batch(&self.order[start..end]) {
            Ok(batch) => Some(Ok(batch)),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = self.source.num_batches().saturating_sub(self.cursor);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use approx::assert_relative_eq;
    use image::GrayImage;
    use std::path::Path;
    use tempfile::tempdir;

    fn raw_stats() -> PixelStats {
        PixelStats {
            mean: 0.0,
            std: 1.0,
            min: 0.0,
            max: 255.0,
            count: 1,
        }
    }

    fn write_corpus(dir: &Path, n: usize, w: u32, h: u32) -> Vec<SamplePair> {
        (0..n)
            .map(|i| {
                let fill = (i * 10) as u8;
                let img = GrayImage::from_pixel(w, h, image::Luma([fill]));
                let image = dir.join(format!("frame_{i:03}.png"));
                img.save(&image).unwrap();
                let label = dir.join(format!("frame_{i:03}.json"));
                std::fs::write(&label, format!("{{\"label\": {}}}", i % 2)).unwrap();
                SamplePair {
                    stem: format!("frame_{i:03}"),
                    image,
                    label,
                }
            })
            .collect()
    }

    fn first_pixels(source: &BatchSource, seed: u64) -> Vec<f32> {
        source
            .batches(seed)
            .flat_map(|b| {
                let b = b.unwrap();
                (0..b.len()).map(move |r| b.images[[r, 0]]).collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_ceil_batch_count_and_sizes() {
        let dir = tempdir().unwrap();
        let pairs = write_corpus(dir.path(), 7, 2, 2);
        let source =
            BatchSource::new(pairs, 2, 2, 3, Normalize::Off, raw_stats(), false).unwrap();

        assert_eq!(source.num_batches(), 3);
        let sizes: Vec<usize> = source.batches(0).map(|b| b.unwrap().len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(sizes.iter().sum::<usize>(), 7);
    }

    #[test]
    fn test_exact_multiple_has_no_short_batch() {
        let dir = tempdir().unwrap();
        let pairs = write_corpus(dir.path(), 6, 2, 2);
        let source =
            BatchSource::new(pairs, 2, 2, 3, Normalize::Off, raw_stats(), false).unwrap();

        let sizes: Vec<usize> = source.batches(0).map(|b| b.unwrap().len()).collect();
        assert_eq!(sizes, vec![3, 3]);
    }

    #[test]
    fn test_batch_larger_than_dataset() {
        let dir = tempdir().unwrap();
        let pairs = write_corpus(dir.path(), 4, 2, 2);
        let source =
            BatchSource::new(pairs, 2, 2, 16, Normalize::Off, raw_stats(), false).unwrap();

        assert_eq!(source.num_batches(), 1);
        let sizes: Vec<usize> = source.batches(0).map(|b| b.unwrap().len()).collect();
        assert_eq!(sizes, vec![4]);
    }

    #[test]
    fn test_unshuffled_order_is_stable() {
        let dir = tempdir().unwrap();
        let pairs = write_corpus(dir.path(), 5, 2, 2);
        let source =
            BatchSource::new(pairs, 2, 2, 2, Normalize::Off, raw_stats(), false).unwrap();

        let a = first_pixels(&source, 1);
        let b = first_pixels(&source, 99);
        assert_eq!(a, b);
        assert_eq!(a, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_shuffled_traversal_reproducible_for_seed() {
        let dir = tempdir().unwrap();
        let pairs = write_corpus(dir.path(), 16, 2, 2);
        let source =
            BatchSource::new(pairs, 2, 2, 4, Normalize::Off, raw_stats(), true).unwrap();

        assert_eq!(first_pixels(&source, 7), first_pixels(&source, 7));
    }

    #[test]
    fn test_shuffled_traversal_varies_with_seed() {
        let dir = tempdir().unwrap();
        let pairs = write_corpus(dir.path(), 16, 2, 2);
        let source =
            BatchSource::new(pairs, 2, 2, 4, Normalize::Off, raw_stats(), true).unwrap();

        assert_ne!(first_pixels(&source, 1), first_pixels(&source, 2));
    }

    #[test]
    fn test_shuffle_covers_every_sample_once() {
        let dir = tempdir().unwrap();
        let pairs = write_corpus(dir.path(), 10, 2, 2);
        let source =
            BatchSource::new(pairs, 2, 2, 3, Normalize::Off, raw_stats(), true).unwrap();

        let mut seen = first_pixels(&source, 3);
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected: Vec<f32> = (0..10).map(|i| (i * 10) as f32).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_standard_normalization() {
        let dir = tempdir().unwrap();
        let pairs = write_corpus(dir.path(), 2, 2, 2);
        let stats = PixelStats {
            mean: 10.0,
            std: 5.0,
            min: 0.0,
            max: 20.0,
            count: 8,
        };
        let source =
            BatchSource::new(pairs, 2, 2, 2, Normalize::Standard, stats, false).unwrap();

        let batch = source.batches(0).next().unwrap().unwrap();
        // frame 0 is constant 0 -> (0 - 10) / 5 = -2; frame 1 constant 10 -> 0
        assert_relative_eq!(batch.images[[0, 0]], -2.0, epsilon = 1e-6);
        assert_relative_eq!(batch.images[[1, 0]], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_minmax_normalization() {
        let dir = tempdir().unwrap();
        let pairs = write_corpus(dir.path(), 2, 2, 2);
        let stats = PixelStats {
            mean: 10.0,
            std: 5.0,
            min: 0.0,
            max: 20.0,
            count: 8,
        };
        let source = BatchSource::new(pairs, 2, 2, 2, Normalize::MinMax, stats, false).unwrap();

        let batch = source.batches(0).next().unwrap().unwrap();
        assert_relative_eq!(batch.images[[0, 0]], 0.0, epsilon = 1e-6);
        assert_relative_eq!(batch.images[[1, 0]], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_labels_align_with_rows() {
        let dir = tempdir().unwrap();
        let pairs = write_corpus(dir.path(), 4, 2, 2);
        let source =
            BatchSource::new(pairs, 2, 2, 4, Normalize::Off, raw_stats(), false).unwrap();

        let batch = source.batches(0).next().unwrap().unwrap();
        assert_eq!(batch.labels.to_vec(), vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_corrupt_sidecar_is_fatal_and_fuses() {
        let dir = tempdir().unwrap();
        let pairs = write_corpus(dir.path(), 4, 2, 2);
        std::fs::write(&pairs[1].label, "{ not json").unwrap();
        let source =
            BatchSource::new(pairs, 2, 2, 2, Normalize::Off, raw_stats(), false).unwrap();

        let mut iter = source.batches(0);
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_dimension_mismatch_is_data_error() {
        let dir = tempdir().unwrap();
        let mut pairs = write_corpus(dir.path(), 2, 2, 2);
        let odd = GrayImage::from_pixel(3, 3, image::Luma([9]));
        odd.save(&pairs[1].image).unwrap();
        let source =
            BatchSource::new(pairs.drain(..).collect(), 2, 2, 2, Normalize::Off, raw_stats(), false)
                .unwrap();

        let err = source.batches(0).next().unwrap().unwrap_err();
        assert_eq!(err.error_code(), "NBL-002");
        assert!(err.to_string().contains("3x3"));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let dir = tempdir().unwrap();
        let pairs = write_corpus(dir.path(), 2, 2, 2);
        assert!(BatchSource::new(pairs, 2, 2, 0, Normalize::Off, raw_stats(), false).is_err());
    }

    #[test]
    fn test_degenerate_stats_rejected() {
        let dir = tempdir().unwrap();
        let pairs = write_corpus(dir.path(), 2, 2, 2);
        let flat = PixelStats {
            mean: 7.0,
            std: 0.0,
            min: 7.0,
            max: 7.0,
            count: 8,
        };
        assert!(BatchSource::new(
            pairs.clone(),
            2,
            2,
            2,
            Normalize::Standard,
            flat,
            false
        )
        .is_err());
        assert!(BatchSource::new(pairs, 2, 2, 2, Normalize::MinMax, flat, false).is_err());
    }
}
