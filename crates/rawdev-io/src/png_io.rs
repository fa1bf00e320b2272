//! PNG conveniences: the raw-PNG input shortcut and the 8-bit writer.
//!
//! The raw-PNG path decodes a 16-bit grayscale PNG as a bare sensor mosaic
//! with fixed levels (black 25, white 1023, GRBG) and the fallback DNG
//! matrices. It exists for fixtures and quick CLI experiments, not as a
//! production input format.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rawdev_core::{CfaPattern, Plane, Rgb8Buffer, Rgb8Layout};

use crate::{IoError, IoResult, RawImage};

/// Fixed black level of the raw-PNG shortcut.
pub const RAW_PNG_BLACK: u16 = 25;
/// Fixed white level of the raw-PNG shortcut.
pub const RAW_PNG_WHITE: u16 = 1023;

/// Loads a 16-bit grayscale PNG as a Bayer mosaic.
pub fn load_raw_png(path: impl AsRef<Path>) -> IoResult<RawImage> {
    let decoder = png::Decoder::new(BufReader::new(File::open(path)?));
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::Decode(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::Decode("cannot determine buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::Decode(e.to_string()))?;

    let samples: Vec<u16> = match (info.color_type, info.bit_depth) {
        (png::ColorType::Grayscale, png::BitDepth::Sixteen) => buf[..info.buffer_size()]
            .chunks_exact(2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .collect(),
        (png::ColorType::Grayscale, png::BitDepth::Eight) => buf[..info.buffer_size()]
            .iter()
            .map(|&b| (b as u16) << 8)
            .collect(),
        (color, depth) => {
            return Err(IoError::Unsupported(format!(
                "raw png must be grayscale, got {color:?}/{depth:?}"
            )));
        }
    };

    let plane = Plane::from_data(info.width, info.height, samples)
        .map_err(|e| IoError::Decode(e.to_string()))?;
    tracing::debug!(
        width = info.width,
        height = info.height,
        "loaded raw png mosaic"
    );

    RawImage::new(plane, CfaPattern::Grbg, RAW_PNG_BLACK, RAW_PNG_WHITE)
        .map_err(|e| IoError::Decode(e.to_string()))
}

/// Writes an 8-bit RGB output buffer as a PNG.
pub fn write_png8(path: impl AsRef<Path>, image: &Rgb8Buffer) -> IoResult<()> {
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), image.width, image.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::Decode(e.to_string()))?;

    match image.layout {
        Rgb8Layout::Interleaved => writer
            .write_image_data(&image.data)
            .map_err(|e| IoError::Decode(e.to_string()))?,
        Rgb8Layout::Planar => {
            let mut interleaved = vec![0u8; image.data.len()];
            let plane = image.width as usize * image.height as usize;
            for i in 0..plane {
                interleaved[i * 3] = image.data[i];
                interleaved[i * 3 + 1] = image.data[plane + i];
                interleaved[i * 3 + 2] = image.data[2 * plane + i];
            }
            writer
                .write_image_data(&interleaved)
                .map_err(|e| IoError::Decode(e.to_string()))?;
        }
    }
    Ok(())
}
