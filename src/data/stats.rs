//! Normalization statistics
//!
//! Computed once from the training split only, before any batching begins,
//! and passed unchanged into both batch sources. Reading the test split
//! here would leak information from evaluation into training.

use std::path::Path;

use crate::data::SamplePair;
use crate::error::{Error, Result};

/// Pixel statistics of a set of frames: mean, population standard
/// deviation, minimum, and maximum over every pixel value.
///
/// Accumulation runs in f64 so the result is invariant to the order of the
/// input file list up to floating-point tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelStats {
    /// Mean pixel value
    pub mean: f32,
    /// Population standard deviation
    pub std: f32,
    /// Smallest pixel value seen
    pub min: f32,
    /// Largest pixel value seen
    pub max: f32,
    /// Number of pixels accumulated
    pub count: u64,
}

impl PixelStats {
    /// Compute statistics over every pixel of every frame in `pairs`.
    ///
    /// One streaming pass; frames are decoded and dropped one at a time.
    /// An undecodable frame is a fatal data error.
    pub fn from_pairs(pairs: &[SamplePair]) -> Result<Self> {
        if pairs.is_empty() {
            return Err(Error::Dataset(
                "cannot compute statistics over an empty training split".to_string(),
            ));
        }

        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut count = 0u64;

        for pair in pairs {
            let gray = decode_gray(&pair.image)?;
            for &px in gray.as_raw() {
                let v = f64::from(px);
                sum += v;
                sum_sq += v * v;
                min = min.min(v);
                max = max.max(v);
                count += 1;
            }
        }

        let n = count as f64;
        let mean = sum / n;
        let variance = (sum_sq / n - mean * mean).max(0.0);
        let std = variance.sqrt();

        if !mean.is_finite() || !std.is_finite() {
            return Err(Error::Numerical(format!(
                "pixel statistics overflowed (mean = {mean}, std = {std})"
            )));
        }

        Ok(PixelStats {
            mean: mean as f32,
            std: std as f32,
            min: min as f32,
            max: max as f32,
            count,
        })
    }

    /// Value range `max - min`.
    pub fn range(&self) -> f32 {
        self.max - self.min
    }
}

pub(crate) fn decode_gray(path: &Path) -> Result<image::GrayImage> {
    let img = image::open(path).map_err(|e| {
        Error::data(
            path,
            format!("cannot decode frame: {e}"),
            "frames must be valid 8-bit grayscale PNG files",
        )
    })?;
    Ok(img.to_luma8())
}
