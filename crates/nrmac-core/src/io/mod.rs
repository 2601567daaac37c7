pub mod decode;
pub mod geotiff;

use std::path::Path;

use crate::error::Result;
use crate::raster::Raster;

/// Source of decoded rasters and their geographic extent.
pub trait RasterSource: Send + Sync {
    /// Decode the image at `path`.
    fn load(&self, path: &Path) -> Result<Raster>;

    /// Model extent of the image as `[min_x, max_x, min_y, max_y]`.
    fn bounds(&self, path: &Path) -> Result<[f64; 4]>;
}

/// Destination for the per-file quality rasters.
pub trait QualitySink: Send + Sync {
    /// Write `score` as a small uniform raster covering `bounds`, given as
    /// `[min_y, max_y, min_x, max_x]`.
    fn write(&self, path: &Path, score: f64, bounds: &[f64; 4], description: &str) -> Result<()>;
}

/// Reads GeoTIFF (and plain image) files from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileRasterSource;

impl RasterSource for FileRasterSource {
    fn load(&self, path: &Path) -> Result<Raster> {
        decode::load_raster(path)
    }

    fn bounds(&self, path: &Path) -> Result<[f64; 4]> {
        geotiff::read_geo_bounds(path)
    }
}

/// Writes quality rasters as GeoTIFF files.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeoTiffSink;

impl QualitySink for GeoTiffSink {
    fn write(&self, path: &Path, score: f64, bounds: &[f64; 4], description: &str) -> Result<()> {
        geotiff::write_quality_raster(path, score, bounds, description)
    }
}
