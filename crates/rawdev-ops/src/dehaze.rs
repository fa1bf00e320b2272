//! Dehaze via the Color Attenuation Prior.
//!
//! Haze raises brightness and lowers saturation together, so the gap
//! between them estimates scene depth. Transmission follows from the depth
//! estimate and the haze model `I = J*t + A*(1 - t)` is inverted with a
//! pure-white atmospheric light A = 1.

use rawdev_core::RgbImage;
use rayon::prelude::*;

/// Atmospheric light, assumed pure white.
const A: f32 = 1.0;

/// Removes haze in place. Bypasses below strength 0.001.
pub fn dehaze(img: &mut RgbImage, strength: f32) {
    if strength < 0.001 {
        return;
    }
    let k = strength / 100.0;
    let w = img.width() as usize;
    let [r, g, b] = img.channels_mut();
    r.data_mut()
        .par_chunks_mut(w)
        .zip(g.data_mut().par_chunks_mut(w))
        .zip(b.data_mut().par_chunks_mut(w))
        .for_each(|((r_row, g_row), b_row)| {
            for i in 0..r_row.len() {
                let v = r_row[i].max(g_row[i]).max(b_row[i]);
                let s = (v - r_row[i].min(g_row[i]).min(b_row[i])) / (v + 1e-6);
                let depth = v - s;
                let t = (1.0 - k * depth).clamp(0.1, 1.0);
                r_row[i] = ((r_row[i] - A) / t + A).max(0.0);
                g_row[i] = ((g_row[i] - A) / t + A).max(0.0);
                b_row[i] = ((b_row[i] - A) / t + A).max(0.0);
            }
        });
}
