//! Camera-to-sRGB color correction.
//!
//! Applies the interpolated 3x4 camera matrix to normalized scene-linear
//! pixels. The matrix offset column is calibrated in the sensor integer
//! domain; callers normalize it by `1 / (white - black)` (see
//! `rawdev_color::normalize_offsets`) before the per-pixel loop. Tint then
//! scales the green channel by `(1 - tint)`. Results clamp at zero; the
//! matrix can push near-black pixels negative.

use rawdev_core::RgbImage;
use rawdev_math::Mat3x4;
use rayon::prelude::*;

/// Applies a color matrix (offsets pre-normalized) and tint in place.
pub fn color_correct(img: &mut RgbImage, matrix: &Mat3x4, tint: f32) {
    let green_scale = 1.0 - tint;
    let w = img.width() as usize;

    let [r, g, b] = img.channels_mut();
    r.data_mut()
        .par_chunks_mut(w)
        .zip(g.data_mut().par_chunks_mut(w))
        .zip(b.data_mut().par_chunks_mut(w))
        .for_each(|((r_row, g_row), b_row)| {
            for i in 0..r_row.len() {
                let out = matrix.apply([r_row[i], g_row[i], b_row[i]], 1.0);
                r_row[i] = out[0].max(0.0);
                g_row[i] = (out[1] * green_scale).max(0.0);
                b_row[i] = out[2].max(0.0);
            }
        });
}
