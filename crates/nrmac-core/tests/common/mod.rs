#![allow(dead_code)]

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use ndarray::{s, Array2, Array3};
use nrmac_core::raster::Raster;
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{TiffEncoder, TiffValue};
use tiff::tags::Tag;

/// Single channel raster whose rows all hold `row_values[row]`.
pub fn row_ramp(row_values: &[u8], width: usize) -> Raster {
    let data = Array2::from_shape_fn((row_values.len(), width), |(row, _)| row_values[row]);
    Raster::from_gray(data)
}

/// Deterministic textured RGB raster.
pub fn textured_rgb(height: usize, width: usize) -> Raster {
    let data = Array3::from_shape_fn((height, width, 3), |(row, col, ch)| {
        ((row * 37 + col * 11 + ch * 53 + (row * col) % 7) % 256) as u8
    });
    Raster::new(data)
}

/// Write an RGB8 GeoTIFF with an upper-left tiepoint at `origin` and
/// `pixel_size` model units per pixel.
pub fn write_rgb_geotiff(path: &Path, raster: &Raster, origin: (f64, f64), pixel_size: (f64, f64)) {
    assert_eq!(raster.channels(), 3);
    let file = File::create(path).expect("create GeoTIFF");
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).expect("TIFF encoder");
    let mut image = encoder
        .new_image::<colortype::RGB8>(raster.width() as u32, raster.height() as u32)
        .expect("new image");
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &[pixel_size.0, pixel_size.1, 0.0][..])
        .expect("pixel scale");
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, origin.0, origin.1, 0.0][..])
        .expect("tiepoint");
    let samples: Vec<u8> = raster.data.iter().copied().collect();
    image.write_data(&samples).expect("write samples");
}

/// Write an RGB8 TIFF without any geo-reference tags.
pub fn write_plain_tiff(path: &Path, raster: &Raster) {
    let file = File::create(path).expect("create TIFF");
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).expect("TIFF encoder");
    let samples: Vec<u8> = raster.data.iter().copied().collect();
    encoder
        .write_image::<colortype::RGB8>(raster.width() as u32, raster.height() as u32, &samples)
        .expect("write TIFF");
}

/// Write a single-band TIFF with samples of colour type `C`.
pub fn write_band_tiff<C: ColorType>(path: &Path, width: u32, height: u32, samples: &[C::Inner])
where
    [C::Inner]: TiffValue,
{
    let file = File::create(path).expect("create TIFF");
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).expect("TIFF encoder");
    encoder
        .write_image::<C>(width, height, samples)
        .expect("write TIFF");
}

/// Write an RGB8 TIFF carrying a row-major 4x4 `ModelTransformationTag`.
pub fn write_transformed_geotiff(path: &Path, raster: &Raster, matrix: &[f64; 16]) {
    let file = File::create(path).expect("create GeoTIFF");
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).expect("TIFF encoder");
    let mut image = encoder
        .new_image::<colortype::RGB8>(raster.width() as u32, raster.height() as u32)
        .expect("new image");
    image
        .encoder()
        .write_tag(Tag::ModelTransformationTag, &matrix[..])
        .expect("transformation");
    let samples: Vec<u8> = raster.data.iter().copied().collect();
    image.write_data(&samples).expect("write samples");
}

/// Write a little-endian, uncompressed RGB8 TIFF stored band by band
/// (`PlanarConfiguration = 2`), `rows_per_strip` rows per strip.
pub fn write_band_sequential_tiff(path: &Path, raster: &Raster, rows_per_strip: usize) {
    const SHORT: u16 = 3;
    const LONG: u16 = 4;

    let (height, width, bands) = raster.shape();
    assert_eq!(bands, 3);

    let mut bytes = b"II\x2a\x00\x00\x00\x00\x00".to_vec();
    let mut offsets = Vec::new();
    let mut counts = Vec::new();
    for band in 0..bands {
        for top in (0..height).step_by(rows_per_strip) {
            let bottom = (top + rows_per_strip).min(height);
            let strip: Vec<u8> = raster
                .data
                .slice(s![top..bottom, .., band])
                .iter()
                .copied()
                .collect();
            offsets.push(bytes.len() as u32);
            counts.push(strip.len() as u32);
            bytes.extend_from_slice(&strip);
        }
    }

    fn word_align(bytes: &mut Vec<u8>) -> u32 {
        if bytes.len() % 2 == 1 {
            bytes.push(0);
        }
        bytes.len() as u32
    }
    let bits_at = word_align(&mut bytes);
    for _ in 0..bands {
        bytes.extend_from_slice(&8u16.to_le_bytes());
    }
    let offsets_at = word_align(&mut bytes);
    for v in &offsets {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    let counts_at = word_align(&mut bytes);
    for v in &counts {
        bytes.extend_from_slice(&v.to_le_bytes());
    }

    let ifd_at = word_align(&mut bytes);
    bytes[4..8].copy_from_slice(&ifd_at.to_le_bytes());
    let strips = offsets.len() as u32;
    let entries: [(u16, u16, u32, u32); 10] = [
        (256, LONG, 1, width as u32),           // ImageWidth
        (257, LONG, 1, height as u32),          // ImageLength
        (258, SHORT, bands as u32, bits_at),    // BitsPerSample
        (259, SHORT, 1, 1),                     // Compression: none
        (262, SHORT, 1, 2),                     // PhotometricInterpretation: RGB
        (273, LONG, strips, offsets_at),        // StripOffsets
        (277, SHORT, 1, bands as u32),          // SamplesPerPixel
        (278, LONG, 1, rows_per_strip as u32),  // RowsPerStrip
        (279, LONG, strips, counts_at),         // StripByteCounts
        (284, SHORT, 1, 2),                     // PlanarConfiguration: planar
    ];
    bytes.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (tag, kind, count, value) in entries {
        bytes.extend_from_slice(&tag.to_le_bytes());
        bytes.extend_from_slice(&kind.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes.extend_from_slice(&0u32.to_le_bytes());

    std::fs::write(path, bytes).expect("write planar TIFF");
}
