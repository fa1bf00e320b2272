//! Final tone mapping: float RGB through the tone-curve LUT to 8-bit.

use rawdev_core::{Rgb8Buffer, RgbImage};
use rawdev_lut::ToneCurveLut;
use rayon::prelude::*;

/// Maps the image through the tone-curve LUT into the output buffer.
///
/// Each float value is encoded to its `u16` index
/// (`clamp(v * 65535, 0, 65535)`), looked up per channel, and the entry's
/// upper byte becomes the display value.
pub fn tone_map(img: &RgbImage, lut: &ToneCurveLut, out: &mut Rgb8Buffer) {
    let (w, h) = img.dimensions();
    debug_assert_eq!((out.width, out.height), (w, h), "output buffer size");

    let encode = |v: f32| -> u16 { (v * 65535.0 + 0.5).clamp(0.0, 65535.0) as u16 };

    // Rows are computed in parallel into a scratch buffer to stay layout
    // agnostic, then written through the buffer's own accessor.
    let rows: Vec<Vec<[u8; 3]>> = (0..h)
        .into_par_iter()
        .map(|y| {
            (0..w)
                .map(|x| {
                    let px = img.pixel(x, y);
                    [
                        lut.final_u8(encode(px[0]), 0),
                        lut.final_u8(encode(px[1]), 1),
                        lut.final_u8(encode(px[2]), 2),
                    ]
                })
                .collect()
        })
        .collect();

    for (y, row) in rows.into_iter().enumerate() {
        for (x, px) in row.into_iter().enumerate() {
            out.put(x as u32, y as u32, px);
        }
    }
}
