pub mod greyscale;
pub mod mac;

use crate::error::Result;
use crate::raster::Raster;

/// Compute the no-reference quality score of a decoded image.
pub fn score(image: &Raster) -> Result<f64> {
    mac::nrmac(image)
}
