use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use ndarray::Array3;
use tiff::decoder::{ChunkType, Decoder, DecodingResult, Limits};
use tiff::tags::{PlanarConfiguration, Tag};
use tracing::debug;

use crate::error::{NrmacError, Result};
use crate::raster::Raster;

/// Upper bound for decoder buffers; field plot mosaics are large.
const TIFF_BUFFER_LIMIT: usize = 1024 * 1024 * 1024;

/// Load an image file, choosing the decoder from the file extension.
pub fn load_raster(path: &Path) -> Result<Raster> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff") => {
            load_tiff(path)
        }
        _ => load_image(path),
    }
}

/// Decode a (Geo)TIFF with all of its bands.
///
/// General purpose image libraries refuse some multi-band GeoTIFFs, so TIFF
/// input goes through the TIFF decoder directly. Band-sequential files
/// (`PlanarConfiguration = 2`) are reassembled chunk by chunk. Samples wider
/// than 8 bits are narrowed with a truncating cast.
pub fn load_tiff(path: &Path) -> Result<Raster> {
    let file = File::open(path)?;

    let mut limits = Limits::default();
    limits.decoding_buffer_size = TIFF_BUFFER_LIMIT;
    limits.ifd_value_size = TIFF_BUFFER_LIMIT;
    limits.intermediate_buffer_size = TIFF_BUFFER_LIMIT;

    let mut decoder = Decoder::new(BufReader::new(file))?.with_limits(limits);
    let (width, height) = decoder.dimensions()?;
    let (h, w) = (height as usize, width as usize);
    let pixels = h * w;
    if pixels == 0 {
        return Err(NrmacError::UnsupportedFormat(format!(
            "{}: empty {}x{} image",
            path.display(),
            w,
            h
        )));
    }

    let planar = decoder
        .find_tag_unsigned::<u16>(Tag::PlanarConfiguration)?
        .and_then(PlanarConfiguration::from_u16)
        == Some(PlanarConfiguration::Planar);
    let bands = decoder
        .find_tag_unsigned::<usize>(Tag::SamplesPerPixel)?
        .unwrap_or(1);

    let samples = if planar && bands > 1 {
        read_band_sequential(&mut decoder, path, w, h, bands)?
    } else {
        narrow_samples(decoder.read_image()?, path)?
    };

    if samples.len() % pixels != 0 {
        return Err(NrmacError::UnsupportedFormat(format!(
            "{}: {} samples do not fill a {}x{} image",
            path.display(),
            samples.len(),
            w,
            h
        )));
    }
    let channels = samples.len() / pixels;
    debug!(
        path = %path.display(),
        width = w,
        height = h,
        channels,
        planar,
        "Decoded TIFF"
    );

    Ok(Raster::new(Array3::from_shape_vec((h, w, channels), samples)?))
}

/// Narrow decoded samples to `u8`: integers wrap modulo 256, floats saturate.
fn narrow_samples(decoded: DecodingResult, path: &Path) -> Result<Vec<u8>> {
    Ok(match decoded {
        DecodingResult::U8(buf) => buf,
        DecodingResult::U16(buf) => buf.into_iter().map(|v| v as u8).collect(),
        DecodingResult::F32(buf) => buf.into_iter().map(|v| v as u8).collect(),
        DecodingResult::F64(buf) => buf.into_iter().map(|v| v as u8).collect(),
        _ => {
            return Err(NrmacError::UnsupportedFormat(format!(
                "{}: only 8/16-bit integer and float samples are supported",
                path.display()
            )))
        }
    })
}

/// Read every plane of a band-sequential TIFF and interleave the planes into
/// `(row, col, band)` order.
///
/// Chunks are numbered plane by plane; each plane has the same strip or tile
/// grid. Tile padding past the image edge is dropped.
fn read_band_sequential<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    path: &Path,
    width: usize,
    height: usize,
    bands: usize,
) -> Result<Vec<u8>> {
    let chunk_count = match decoder.get_chunk_type() {
        ChunkType::Strip => decoder.strip_count()?,
        ChunkType::Tile => decoder.tile_count()?,
    } as usize;
    if chunk_count == 0 || chunk_count % bands != 0 {
        return Err(NrmacError::UnsupportedFormat(format!(
            "{}: {} chunks cannot be split into {} bands",
            path.display(),
            chunk_count,
            bands
        )));
    }
    let per_band = chunk_count / bands;
    let (chunk_w, chunk_h) = decoder.chunk_dimensions();
    let (chunk_w, chunk_h) = (chunk_w as usize, chunk_h as usize);
    let across = width.div_ceil(chunk_w);

    let mut samples = vec![0u8; width * height * bands];
    for chunk in 0..chunk_count {
        let (data_w, data_h) = decoder.chunk_data_dimensions(chunk as u32);
        let (data_w, data_h) = (data_w as usize, data_h as usize);
        let data = narrow_samples(decoder.read_chunk(chunk as u32)?, path)?;
        if data.len() < data_w * data_h {
            return Err(NrmacError::UnsupportedFormat(format!(
                "{}: chunk {} holds {} samples, expected {}",
                path.display(),
                chunk,
                data.len(),
                data_w * data_h
            )));
        }

        let band = chunk / per_band;
        let index = chunk % per_band;
        let (x0, y0) = ((index % across) * chunk_w, (index / across) * chunk_h);
        let rows = data_h.min(height.saturating_sub(y0));
        let cols = data_w.min(width.saturating_sub(x0));
        for r in 0..rows {
            let row = &data[r * data_w..r * data_w + cols];
            let start = ((y0 + r) * width + x0) * bands + band;
            for (c, &v) in row.iter().enumerate() {
                samples[start + c * bands] = v;
            }
        }
    }
    Ok(samples)
}

/// Decode PNG, JPEG and the other formats supported by the `image` crate.
///
/// Grey images keep a single channel; everything else is converted to RGB.
pub fn load_image(path: &Path) -> Result<Raster> {
    let img = image::open(path)?;
    let (channels, raw, w, h) = if img.color().has_color() {
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        (3, rgb.into_raw(), w, h)
    } else {
        let gray = img.to_luma8();
        let (w, h) = gray.dimensions();
        (1, gray.into_raw(), w, h)
    };
    debug!(path = %path.display(), width = w, height = h, channels, "Decoded image");

    Ok(Raster::new(Array3::from_shape_vec(
        (h as usize, w as usize, channels),
        raw,
    )?))
}
