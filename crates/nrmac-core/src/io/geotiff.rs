use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tiff::decoder::Decoder;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tracing::debug;

use crate::consts::{QUALITY_RASTER_EPSG, QUALITY_RASTER_SIZE};
use crate::error::{NrmacError, Result};

/// GeoKey directory for a geographic WGS84 raster with pixel-is-area
/// semantics.
const GEO_KEY_DIRECTORY: [u16; 16] = [
    1, 1, 0, 3, // header: version, revision, minor, key count
    1024, 0, 1, 2, // GTModelTypeGeoKey = ModelTypeGeographic
    1025, 0, 1, 1, // GTRasterTypeGeoKey = RasterPixelIsArea
    2048, 0, 1, QUALITY_RASTER_EPSG, // GeographicTypeGeoKey
];

/// Affine mapping from raster (col, row) to model (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build from `ModelPixelScaleTag` and the first `ModelTiepointTag` entry.
    fn from_tiepoint(scale: &[f64], tiepoint: &[f64]) -> Option<Self> {
        if scale.len() < 2 || tiepoint.len() < 6 {
            return None;
        }
        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        Some(Self {
            origin_x: x - i * scale[0],
            pixel_width: scale[0],
            row_rotation: 0.0,
            origin_y: y + j * scale[1],
            col_rotation: 0.0,
            pixel_height: -scale[1],
        })
    }

    /// Build from the row-major 4x4 `ModelTransformationTag` matrix.
    fn from_matrix(m: &[f64]) -> Option<Self> {
        if m.len() < 16 {
            return None;
        }
        Some(Self {
            origin_x: m[3],
            pixel_width: m[0],
            row_rotation: m[1],
            origin_y: m[7],
            col_rotation: m[4],
            pixel_height: m[5],
        })
    }

    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width + row * self.row_rotation,
            self.origin_y + col * self.col_rotation + row * self.pixel_height,
        )
    }

    /// Extent of a `width` x `height` raster as `[min_x, max_x, min_y, max_y]`.
    pub fn extent(&self, width: u32, height: u32) -> [f64; 4] {
        let (w, h) = (width as f64, height as f64);
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(w, 0.0),
            self.apply(0.0, h),
            self.apply(w, h),
        ];
        let mut bounds = [f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY];
        for (x, y) in corners {
            bounds[0] = bounds[0].min(x);
            bounds[1] = bounds[1].max(x);
            bounds[2] = bounds[2].min(y);
            bounds[3] = bounds[3].max(y);
        }
        bounds
    }
}

/// Read the model extent of a GeoTIFF as `[min_x, max_x, min_y, max_y]`.
///
/// Uses `ModelTransformationTag` when present, otherwise the pixel scale and
/// the first tiepoint.
pub fn read_geo_bounds(path: &Path) -> Result<[f64; 4]> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file))?;
    let (width, height) = decoder.dimensions()?;

    let transform = match decoder.find_tag(Tag::ModelTransformationTag)? {
        Some(matrix) => GeoTransform::from_matrix(&matrix.into_f64_vec()?),
        None => {
            let scale = decoder.find_tag(Tag::ModelPixelScaleTag)?;
            let tiepoint = decoder.find_tag(Tag::ModelTiepointTag)?;
            match (scale, tiepoint) {
                (Some(scale), Some(tiepoint)) => GeoTransform::from_tiepoint(
                    &scale.into_f64_vec()?,
                    &tiepoint.into_f64_vec()?,
                ),
                _ => None,
            }
        }
    };

    let transform =
        transform.ok_or_else(|| NrmacError::MissingGeoReference(path.display().to_string()))?;
    let bounds = transform.extent(width, height);
    debug!(path = %path.display(), ?bounds, "Read geo bounds");
    Ok(bounds)
}

/// Reorder source bounds `[min_x, max_x, min_y, max_y]` into the
/// `[min_y, max_y, min_x, max_x]` layout the quality raster writer expects.
pub fn quality_bounds(bounds: &[f64; 4]) -> [f64; 4] {
    [bounds[2], bounds[3], bounds[0], bounds[1]]
}

/// Write a uniform `f64` GeoTIFF holding `score` in every cell.
///
/// `bounds` is `[min_y, max_y, min_x, max_x]`; the raster's upper-left corner
/// is `(min_x, max_y)` and rows run southwards. `description` is stored in the
/// `ImageDescription` tag.
pub fn write_quality_raster(
    path: &Path,
    score: f64,
    bounds: &[f64; 4],
    description: &str,
) -> Result<()> {
    let [min_y, max_y, min_x, max_x] = *bounds;
    let size = QUALITY_RASTER_SIZE as f64;
    let pixel_scale = [(max_x - min_x) / size, (max_y - min_y) / size, 0.0];
    let tiepoint = [0.0, 0.0, 0.0, min_x, max_y, 0.0];

    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;
    let mut image =
        encoder.new_image::<colortype::Gray64Float>(QUALITY_RASTER_SIZE, QUALITY_RASTER_SIZE)?;

    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &pixel_scale[..])?;
    image.encoder().write_tag(Tag::ModelTiepointTag, &tiepoint[..])?;
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, &GEO_KEY_DIRECTORY[..])?;
    image.encoder().write_tag(Tag::ImageDescription, description)?;

    let cells = vec![score; (QUALITY_RASTER_SIZE * QUALITY_RASTER_SIZE) as usize];
    image.write_data(&cells)?;

    debug!(path = %path.display(), score, ?bounds, "Wrote quality raster");
    Ok(())
}
