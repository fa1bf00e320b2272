//! Global saturation against Rec.601 luma.

use rawdev_core::RgbImage;
use rayon::prelude::*;

/// Scales chroma around the per-pixel luma: `out = luma + sat * (v - luma)`.
///
/// `sat` of 1.0 is the identity; 0 produces grayscale. Results clamp at
/// zero but not above, pre-tone-curve highlights may exceed 1.0.
pub fn saturation(img: &mut RgbImage, sat: f32) {
    if (sat - 1.0).abs() < 1e-6 {
        return;
    }
    let w = img.width() as usize;
    let [r, g, b] = img.channels_mut();
    r.data_mut()
        .par_chunks_mut(w)
        .zip(g.data_mut().par_chunks_mut(w))
        .zip(b.data_mut().par_chunks_mut(w))
        .for_each(|((r_row, g_row), b_row)| {
            for i in 0..r_row.len() {
                let luma = 0.299 * r_row[i] + 0.587 * g_row[i] + 0.114 * b_row[i];
                r_row[i] = (luma + sat * (r_row[i] - luma)).max(0.0);
                g_row[i] = (luma + sat * (g_row[i] - luma)).max(0.0);
                b_row[i] = (luma + sat * (b_row[i] - luma)).max(0.0);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_saturation_is_identity() {
        let mut img = RgbImage::new(1, 1);
        img.set_pixel(0, 0, [0.3, 0.5, 0.7]);
        saturation(&mut img, 1.0);
        assert_eq!(img.pixel(0, 0), [0.3, 0.5, 0.7]);
    }

    #[test]
    fn test_zero_saturation_is_grayscale() {
        let mut img = RgbImage::new(1, 1);
        img.set_pixel(0, 0, [0.2, 0.6, 0.9]);
        saturation(&mut img, 0.0);
        let px = img.pixel(0, 0);
        assert_relative_eq!(px[0], px[1]);
        assert_relative_eq!(px[1], px[2]);
    }

    #[test]
    fn test_pure_blue_boost() {
        // Boosting a pure blue must not leak into red or green, and the
        // blue channel keeps nearly all of its energy.
        let mut img = RgbImage::new(1, 1);
        img.set_pixel(0, 0, [0.0, 0.0, 1.0]);
        saturation(&mut img, 1.5);
        let px = img.pixel(0, 0);
        assert!(px[0] < 2.0 / 65535.0, "r = {}", px[0]);
        assert!(px[1] < 2.0 / 65535.0, "g = {}", px[1]);
        assert!(px[2] > 65000.0 / 65535.0, "b = {}", px[2]);
    }

    #[test]
    fn test_gray_is_fixed_point() {
        let mut img = RgbImage::new(1, 1);
        img.set_pixel(0, 0, [0.5, 0.5, 0.5]);
        saturation(&mut img, 2.5);
        let px = img.pixel(0, 0);
        for v in px {
            assert_relative_eq!(v, 0.5, epsilon = 1e-6);
        }
    }
}
