use ndarray::{Array2, Array3, Axis};
use std::path::PathBuf;

/// A decoded image with 8-bit samples.
///
/// Samples are stored as `(height, width, channels)`. Single channel images
/// use a trailing axis of length 1.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    pub data: Array3<u8>,
}

impl Raster {
    pub fn new(data: Array3<u8>) -> Self {
        Self { data }
    }

    /// Wrap a `(height, width)` array as a single channel raster.
    pub fn from_gray(data: Array2<u8>) -> Self {
        Self {
            data: data.insert_axis(Axis(2)),
        }
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }
}

/// Where a raster came from, as reported by the `score` command.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub filename: PathBuf,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
}

impl SourceInfo {
    pub fn new(filename: PathBuf, raster: &Raster) -> Self {
        Self {
            filename,
            width: raster.width(),
            height: raster.height(),
            channels: raster.channels(),
        }
    }
}
