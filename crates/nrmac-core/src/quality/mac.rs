use ndarray::{s, Array2};

use crate::consts::{MAC_SCALES, MAX_MAC_SCALE};
use crate::error::{NrmacError, Result};
use crate::raster::Raster;

use super::greyscale::intensity_plane;

/// NRMAC value of an image together with its per-scale features.
#[derive(Clone, Debug, PartialEq)]
pub struct MacScore {
    /// Mean feature per entry of [`MAC_SCALES`], same order.
    pub features: [f64; MAC_SCALES.len()],
    /// Mean of `features`.
    pub nrmac: f64,
}

/// Multiscale autocorrelation of `im0` using `im1` and `im2` as the initial
/// contents of the two shift buffers.
///
/// For each scale `s` the first buffer receives the reference shifted up by
/// one row and the second the reference shifted up by `s` rows. Rows past the
/// shifted range are not reset between scales, so later scales see the tail
/// left behind by earlier ones. The feature for a scale is
/// `mean(im0 * (shift1 - shift2))` and the score is the mean of the features.
///
/// All three images must have the same shape and more than
/// [`MAX_MAC_SCALE`] rows.
pub fn mac(im1: &Raster, im2: &Raster, im0: &Raster) -> Result<MacScore> {
    let expected = im1.shape();
    for other in [im2, im0] {
        if other.shape() != expected {
            return Err(NrmacError::ShapeMismatch {
                expected,
                actual: other.shape(),
            });
        }
    }

    let height = expected.0;
    if height <= MAX_MAC_SCALE {
        return Err(NrmacError::ImageTooSmall {
            height,
            min_rows: MAX_MAC_SCALE + 1,
        });
    }

    let reference = intensity_plane(im0)?;
    let mut shift1 = intensity_plane(im1)?;
    let mut shift2 = intensity_plane(im2)?;

    Ok(mac_planes(&reference, &mut shift1, &mut shift2))
}

/// Score a single image against itself.
pub fn nrmac(image: &Raster) -> Result<f64> {
    mac(image, image, image).map(|score| score.nrmac)
}

fn mac_planes(
    reference: &Array2<f64>,
    shift1: &mut Array2<f64>,
    shift2: &mut Array2<f64>,
) -> MacScore {
    let height = reference.nrows();
    let mut features = [0.0; MAC_SCALES.len()];

    for (feature, &scale) in features.iter_mut().zip(MAC_SCALES.iter()) {
        shift1
            .slice_mut(s![..height - 1, ..])
            .assign(&reference.slice(s![1.., ..]));
        shift2
            .slice_mut(s![..height - scale, ..])
            .assign(&reference.slice(s![scale.., ..]));

        let diff = reference * &(&*shift1 - &*shift2);
        *feature = diff.mean().unwrap_or(0.0);
    }

    let nrmac = features.iter().sum::<f64>() / features.len() as f64;
    MacScore { features, nrmac }
}
