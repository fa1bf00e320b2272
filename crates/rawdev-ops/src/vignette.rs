//! Vignette: radial brightness falloff with highlight protection.

use rawdev_core::RgbImage;
use rawdev_math::{lerp, smoothstep};
use rayon::prelude::*;

/// Vignette controls, in UI ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VignetteSettings {
    /// Strength in [-100, 100]; positive darkens the corners.
    pub amount: f32,
    /// Falloff reach in [0, 100]; maps to an exponent in [0.25, 8].
    pub midpoint: f32,
    /// Shape in [0, 100]; 0 circular, 100 elliptical.
    pub roundness: f32,
    /// Highlight protection in [0, 100].
    pub highlights: f32,
}

impl Default for VignetteSettings {
    fn default() -> Self {
        Self {
            amount: 0.0,
            midpoint: 50.0,
            roundness: 100.0,
            highlights: 0.0,
        }
    }
}

/// Applies the vignette in place.
pub fn vignette(img: &mut RgbImage, settings: &VignetteSettings) {
    let amount = settings.amount * 0.01;
    if amount.abs() < 1e-6 {
        return;
    }
    let midpoint = settings.midpoint * 0.01;
    let roundness = settings.roundness * 0.01;
    let protection = settings.highlights * 0.01;

    let (w, h) = img.dimensions();
    let center_x = (w as f32 - 1.0) / 2.0;
    let center_y = (h as f32 - 1.0) / 2.0;
    let min_r = center_x.min(center_y);
    // Blend between a circular and an elliptical footprint.
    let scale_x = lerp(min_r, center_x, roundness);
    let scale_y = lerp(min_r, center_y, roundness);
    let exponent = 0.25 * 32f32.powf(midpoint);

    let [r, g, b] = img.channels_mut();
    r.data_mut()
        .par_chunks_mut(w as usize)
        .zip(g.data_mut().par_chunks_mut(w as usize))
        .zip(b.data_mut().par_chunks_mut(w as usize))
        .enumerate()
        .for_each(|(y, ((r_row, g_row), b_row))| {
            let dy = y as f32 - center_y;
            let ny = dy / (scale_y + 1e-6);
            for i in 0..r_row.len() {
                let dx = i as f32 - center_x;
                let nx = dx / (scale_x + 1e-6);
                let radius = (nx * nx + ny * ny).max(0.0).sqrt();
                let factor = 1.0 - amount * radius.powf(exponent);

                let luma = 0.299 * r_row[i] + 0.587 * g_row[i] + 0.114 * b_row[i];
                let highlight_blend = smoothstep(0.75, 1.0, luma);
                let protected = lerp(factor, 1.0, highlight_blend * protection);
                let final_factor = if amount > 0.0 { protected } else { factor };

                r_row[i] *= final_factor;
                g_row[i] *= final_factor;
                b_row[i] *= final_factor;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gray_image(w: u32, h: u32, v: f32) -> RgbImage {
        let mut img = RgbImage::new(w, h);
        img.map_pixels(|_| [v, v, v]);
        img
    }

    #[test]
    fn test_zero_amount_is_bypass() {
        let mut img = gray_image(16, 16, 0.5);
        vignette(&mut img, &VignetteSettings::default());
        assert_eq!(img.pixel(0, 0), [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_positive_amount_darkens_corners() {
        let mut img = gray_image(33, 33, 0.5);
        let settings = VignetteSettings {
            amount: 80.0,
            ..Default::default()
        };
        vignette(&mut img, &settings);
        let center = img.pixel(16, 16)[0];
        let corner = img.pixel(0, 0)[0];
        assert!(corner < center, "corner {corner} vs center {center}");
        assert_relative_eq!(center, 0.5, epsilon = 0.01);
    }

    #[test]
    fn test_negative_amount_brightens_corners() {
        let mut img = gray_image(33, 33, 0.5);
        let settings = VignetteSettings {
            amount: -80.0,
            ..Default::default()
        };
        vignette(&mut img, &settings);
        assert!(img.pixel(0, 0)[0] > 0.5);
    }

    #[test]
    fn test_highlight_protection_spares_bright_corners() {
        let settings = VignetteSettings {
            amount: 80.0,
            highlights: 100.0,
            ..Default::default()
        };
        let mut bright = gray_image(33, 33, 0.98);
        vignette(&mut bright, &settings);
        let mut unprotected = gray_image(33, 33, 0.98);
        vignette(
            &mut unprotected,
            &VignetteSettings {
                highlights: 0.0,
                ..settings
            },
        );
        assert!(bright.pixel(0, 0)[0] > unprotected.pixel(0, 0)[0]);
    }

    #[test]
    fn test_midpoint_controls_reach() {
        // A higher midpoint pushes the falloff toward the corners, so a
        // mid-radius pixel keeps more of its value.
        let base = VignetteSettings {
            amount: 80.0,
            ..Default::default()
        };
        let mut soft = gray_image(33, 33, 0.5);
        vignette(
            &mut soft,
            &VignetteSettings {
                midpoint: 10.0,
                ..base
            },
        );
        let mut hard = gray_image(33, 33, 0.5);
        vignette(
            &mut hard,
            &VignetteSettings {
                midpoint: 90.0,
                ..base
            },
        );
        assert!(hard.pixel(8, 16)[0] > soft.pixel(8, 16)[0]);
    }
}
