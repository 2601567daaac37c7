use ndarray::{Array2, Axis};

use crate::consts::{GREY_WEIGHT_B, GREY_WEIGHT_G, GREY_WEIGHT_R};
use crate::error::{NrmacError, Result};
use crate::raster::Raster;

/// Weighted luma of one RGB sample, before rounding.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    GREY_WEIGHT_R * r as f64 + GREY_WEIGHT_G * g as f64 + GREY_WEIGHT_B * b as f64
}

/// Reduce a raster to the f64 intensity plane the autocorrelation runs on.
///
/// Multi-channel rasters are collapsed with the broadcast luma weights on
/// their first three channels and rounded half-to-even, which keeps the
/// result on the integer grid of the source samples. Single channel rasters
/// are widened unchanged.
pub fn intensity_plane(raster: &Raster) -> Result<Array2<f64>> {
    match raster.channels() {
        1 => Ok(raster.data.index_axis(Axis(2), 0).mapv(f64::from)),
        c if c >= 3 => {
            let (h, w, _) = raster.shape();
            let data = &raster.data;
            Ok(Array2::from_shape_fn((h, w), |(row, col)| {
                luma(data[[row, col, 0]], data[[row, col, 1]], data[[row, col, 2]])
                    .round_ties_even()
            }))
        }
        c => Err(NrmacError::UnsupportedChannels(c)),
    }
}
