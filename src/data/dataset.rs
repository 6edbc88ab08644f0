//! Dataset discovery
//!
//! A sample is a pair of files sharing a stem: `<stem>.png` (8-bit grayscale
//! frame) and `<stem>.json` (label sidecar `{"label": 0|1}`). Discovery
//! collects the pairs in sorted stem order, probes the frame dimensions from
//! the first image, and rejects a directory where any frame lacks its
//! sidecar. Every frame in a dataset must share the same dimensions; the
//! batch source enforces this per file, discovery establishes the expected
//! value.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Label value for a clear-sky frame.
pub const CLEAR: f32 = 0.0;
/// Label value for a cloudy frame.
pub const CLOUD: f32 = 1.0;

/// One image/label file pair, index-aligned by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePair {
    /// Shared file stem, e.g. `sky_0042`
    pub stem: String,
    /// Path of the PNG frame
    pub image: PathBuf,
    /// Path of the JSON label sidecar
    pub label: PathBuf,
}

/// A discovered dataset: sorted sample pairs plus the frame dimensions
/// probed from the first image.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All pairs, sorted by stem
    pub pairs: Vec<SamplePair>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

#[derive(Deserialize)]
struct LabelSidecar {
    label: u8,
}

/// Read and validate one label sidecar. Returns [`CLEAR`] or [`CLOUD`].
pub(crate) fn read_label(path: &Path) -> Result<f32> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::data(
            path,
            format!("cannot read label sidecar: {e}"),
            "every frame needs a <stem>.json sidecar next to it",
        )
    })?;
    let sidecar: LabelSidecar = serde_json::from_str(&content).map_err(|e| {
        Error::data(
            path,
            format!("malformed label sidecar: {e}"),
            "expected {\"label\": 0} for clear or {\"label\": 1} for cloud",
        )
    })?;
    match sidecar.label {
        0 => Ok(CLEAR),
        1 => Ok(CLOUD),
        other => Err(Error::data(
            path,
            format!("label {other} out of range"),
            "labels must be 0 (clear) or 1 (cloud)",
        )),
    }
}

impl Dataset {
    /// Discover all sample pairs under `dir`.
    ///
    /// Fails if the directory does not exist, contains no frames, or
    /// contains a frame without a label sidecar. The first frame is decoded
    /// to establish the expected dimensions.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::Dataset(format!(
                "data directory {} does not exist",
                dir.display()
            )));
        }

        let mut pairs = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("png") {
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s.to_string(),
                None => continue,
            };
            let label = path.with_extension("json");
            if !label.is_file() {
                return Err(Error::data(
                    &path,
                    "frame has no label sidecar",
                    format!("create {} with {{\"label\": 0|1}}", label.display()),
                ));
            }
            pairs.push(SamplePair {
                stem,
                image: path,
                label,
            });
        }

        if pairs.is_empty() {
            return Err(Error::Dataset(format!(
                "no .png frames found in {}",
                dir.display()
            )));
        }
        pairs.sort_by(|a, b| a.stem.cmp(&b.stem));

        let first = &pairs[0].image;
        let probe = image::open(first).map_err(|e| {
            Error::data(
                first,
                format!("cannot decode frame: {e}"),
                "frames must be valid 8-bit grayscale PNG files",
            )
        })?;
        let gray = probe.to_luma8();
        let (width, height) = gray.dimensions();

        Ok(Dataset {
            pairs,
            width,
            height,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when the dataset holds no samples.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pixels per frame; the feature count of a flattened sample.
    pub fn features(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Count (clear, cloud) labels across the whole dataset. Reads every
    /// sidecar; any malformed sidecar is a fatal data error.
    pub fn class_counts(&self) -> Result<(usize, usize)> {
        let mut clear = 0;
        let mut cloud = 0;
        for pair in &self.pairs {
            if read_label(&pair.label)? == CLOUD {
                cloud += 1;
            } else {
                clear += 1;
            }
        }
        Ok((clear, cloud))
    }
}
