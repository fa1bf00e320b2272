//! Bicubic (Catmull-Rom) resampling for downscaled output.

use rawdev_core::{Plane, RgbImage};
use rayon::prelude::*;

/// Catmull-Rom cubic interpolation over four taps.
#[inline]
fn cubic_interp(p0: f32, p1: f32, p2: f32, p3: f32, x: f32) -> f32 {
    p1 + 0.5
        * x
        * (p2 - p0
            + x * (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3 + x * (3.0 * (p1 - p2) + p3 - p0)))
}

/// Resizes the image to the requested dimensions with bicubic sampling.
///
/// Pixel centers align (`src = (dst + 0.5) * scale - 0.5`); edge-repeat
/// outside the frame. A same-size request returns a plain copy.
pub fn resize_bicubic(img: &RgbImage, out_w: u32, out_h: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    if (out_w, out_h) == (w, h) {
        return img.clone();
    }

    let scale_x = w as f32 / out_w as f32;
    let scale_y = h as f32 / out_h as f32;

    let mut out = RgbImage::new(out_w, out_h);
    for c in 0..3 {
        let src: &Plane<f32> = img.channel(c);
        out.channel_mut(c)
            .data_mut()
            .par_chunks_mut(out_w as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let src_y = (y as f32 + 0.5) * scale_y - 0.5;
                let iy = src_y.floor() as i64;
                let fy = src_y - iy as f32;
                for (x, slot) in row.iter_mut().enumerate() {
                    let src_x = (x as f32 + 0.5) * scale_x - 0.5;
                    let ix = src_x.floor() as i64;
                    let fx = src_x - ix as f32;

                    // Vertical pass over the four neighboring columns,
                    // then one horizontal interpolation.
                    let mut cols = [0.0f32; 4];
                    for (i, col) in cols.iter_mut().enumerate() {
                        let cx = ix - 1 + i as i64;
                        *col = cubic_interp(
                            src.at_repeat(cx, iy - 1),
                            src.at_repeat(cx, iy),
                            src.at_repeat(cx, iy + 1),
                            src.at_repeat(cx, iy + 2),
                            fy,
                        );
                    }
                    *slot = cubic_interp(cols[0], cols[1], cols[2], cols[3], fx);
                }
            });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gradient(w: u32, h: u32) -> RgbImage {
        let mut img = RgbImage::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let v = x as f32 / (w - 1) as f32;
                img.set_pixel(x, y, [v, v, v]);
            }
        }
        img
    }

    #[test]
    fn test_same_size_is_copy() {
        let img = gradient(16, 16);
        let out = resize_bicubic(&img, 16, 16);
        assert_eq!(out.pixel(7, 7), img.pixel(7, 7));
    }

    #[test]
    fn test_constant_survives_downscale() {
        let mut img = RgbImage::new(32, 32);
        img.map_pixels(|_| [0.4, 0.4, 0.4]);
        let out = resize_bicubic(&img, 16, 16);
        assert_eq!(out.dimensions(), (16, 16));
        for c in 0..3 {
            for v in out.channel(c).data() {
                assert_relative_eq!(*v, 0.4, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_half_downscale_keeps_ramp() {
        let img = gradient(64, 8);
        let out = resize_bicubic(&img, 32, 4);
        // The ramp survives: monotone left to right, endpoints near 0/1.
        let mut prev = -1.0f32;
        for x in 0..32 {
            let v = out.pixel(x, 2)[0];
            assert!(v >= prev - 1e-4, "non-monotone at {x}");
            prev = v;
        }
        assert!(out.pixel(0, 2)[0] < 0.1);
        assert!(out.pixel(31, 2)[0] > 0.9);
    }

    #[test]
    fn test_catmull_rom_passes_through_samples() {
        // With x = 0 the kernel returns p1 exactly.
        assert_eq!(cubic_interp(9.0, 3.0, 7.0, 2.0, 0.0), 3.0);
        assert_eq!(cubic_interp(9.0, 3.0, 7.0, 2.0, 1.0), 7.0);
    }
}
