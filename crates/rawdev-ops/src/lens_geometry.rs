//! Lens geometry and per-channel lateral CA resampling.
//!
//! A single pull-based inverse warp: for every destination pixel and
//! channel the kernel walks the inverse transform chain (geometry, then
//! radial distortion through the prebuilt LUT, then per-channel lateral CA
//! scaling) to find the source position, and samples it bilinearly.
//! Samples that land outside the image return 0.

use rawdev_core::{Plane, RgbImage};
use rawdev_lut::DistortionLut;
use rayon::prelude::*;

/// Geometric correction controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensGeometry {
    /// Rotation in degrees.
    pub rotate: f32,
    /// Scale in percent (100 = unity).
    pub scale: f32,
    /// Horizontal aspect multiplier.
    pub aspect: f32,
    /// Vertical keystone in [-100, 100].
    pub keystone_v: f32,
    /// Horizontal keystone in [-100, 100].
    pub keystone_h: f32,
    /// Horizontal offset in pixels.
    pub offset_x: f32,
    /// Vertical offset in pixels.
    pub offset_y: f32,
    /// Red/cyan lateral CA in [-100, 100].
    pub ca_red_cyan: f32,
    /// Blue/yellow lateral CA in [-100, 100].
    pub ca_blue_yellow: f32,
}

impl Default for LensGeometry {
    fn default() -> Self {
        Self {
            rotate: 0.0,
            scale: 100.0,
            aspect: 1.0,
            keystone_v: 0.0,
            keystone_h: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            ca_red_cyan: 0.0,
            ca_blue_yellow: 0.0,
        }
    }
}

/// Lateral CA scale per unit of slider travel and squared radius.
const CA_SCALE: f32 = 2e-5;

/// Keystone denominator floor.
const KEYSTONE_EPS: f32 = 1e-4;

/// Resamples the image through the inverse geometry/distortion/CA chain.
pub fn lens_resample(img: &RgbImage, geo: &LensGeometry, lut: &DistortionLut) -> RgbImage {
    let (w, h) = img.dimensions();
    let center_x = (w as f32 - 1.0) / 2.0;
    let center_y = (h as f32 - 1.0) / 2.0;
    // Radii normalize by the smaller half-dimension, the convention lens
    // profile databases calibrate against.
    let r_norm = center_x.min(center_y).max(1.0);
    let ca_max_radius_sq = center_x.max(center_y) * center_x.max(center_y);

    let angle_rad = -geo.rotate.to_radians();
    let (sin_a, cos_a) = angle_rad.sin_cos();
    let kv = geo.keystone_v / 100.0;
    let kh = geo.keystone_h / 100.0;
    let inv_scale = 100.0 / geo.scale.max(1.0);

    let mut out = RgbImage::new(w, h);
    for c in 0..3 {
        let src = img.channel(c);
        let dst: &mut Plane<f32> = out.channel_mut(c);
        dst.data_mut()
            .par_chunks_mut(w as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, slot) in row.iter_mut().enumerate() {
                    // 1. Inverse geometric chain, centered coordinates.
                    let mut cur_x = x as f32 - center_x;
                    let mut cur_y = y as f32 - center_y;

                    let rot_x = cur_x * cos_a - cur_y * sin_a;
                    let rot_y = cur_x * sin_a + cur_y * cos_a;
                    cur_x = rot_x;
                    cur_y = rot_y;

                    let mut denom = 1.0 - kv * cur_y / center_y - kh * cur_x / center_x;
                    if denom <= KEYSTONE_EPS {
                        denom = KEYSTONE_EPS;
                    }
                    cur_x /= denom;
                    cur_y /= denom;

                    cur_x *= inv_scale * geo.aspect;
                    cur_y *= inv_scale;
                    cur_x += center_x - geo.offset_x;
                    cur_y += center_y - geo.offset_y;

                    // 2. Radial distortion through the inverse LUT.
                    if !lut.is_identity() {
                        let dx = cur_x - center_x;
                        let dy = cur_y - center_y;
                        let rd_sq = dx * dx + dy * dy;
                        let rd = rd_sq.sqrt();
                        let ru_over_rd = lut.sample(rd_sq / (r_norm * r_norm));
                        let scale = (rd * ru_over_rd) / (rd + 1e-6);
                        cur_x = center_x + dx * scale;
                        cur_y = center_y + dy * scale;
                    }

                    // 3. Per-channel lateral CA for red and blue.
                    if c != 1 {
                        let slider = if c == 0 {
                            geo.ca_red_cyan
                        } else {
                            geo.ca_blue_yellow
                        };
                        let dx = cur_x - center_x;
                        let dy = cur_y - center_y;
                        let r2 = (dx * dx + dy * dy) / ca_max_radius_sq;
                        let ca = 1.0 + slider * CA_SCALE * r2;
                        cur_x = center_x + dx * ca;
                        cur_y = center_y + dy * ca;
                    }

                    // 4. Bilinear sample; outside the frame is black.
                    let in_bounds = cur_x >= 0.0
                        && cur_x <= w as f32 - 1.0
                        && cur_y >= 0.0
                        && cur_y <= h as f32 - 1.0;
                    *slot = if in_bounds {
                        src.sample_bilinear(cur_x, cur_y)
                    } else {
                        0.0
                    };
                }
            });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rawdev_lut::DistortionModel;

    fn gradient_image(w: u32, h: u32) -> RgbImage {
        let mut img = RgbImage::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let v = (x + y * w) as f32 / (w * h) as f32;
                img.set_pixel(x, y, [v, v * 0.5, v * 0.25]);
            }
        }
        img
    }

    #[test]
    fn test_neutral_chain_is_identity() {
        let img = gradient_image(16, 16);
        let out = lens_resample(&img, &LensGeometry::default(), &DistortionLut::identity());
        for y in 0..16 {
            for x in 0..16 {
                let a = img.pixel(x, y);
                let b = out.pixel(x, y);
                for c in 0..3 {
                    assert_relative_eq!(a[c], b[c], epsilon = 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_offset_shifts_image() {
        let img = gradient_image(16, 16);
        let geo = LensGeometry {
            offset_x: 2.0,
            ..Default::default()
        };
        let out = lens_resample(&img, &geo, &DistortionLut::identity());
        // Destination x samples from source x - 2.
        assert_relative_eq!(
            out.pixel(5, 5)[0],
            img.pixel(3, 5)[0],
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_rotation_180_flips() {
        let img = gradient_image(17, 17);
        let geo = LensGeometry {
            rotate: 180.0,
            ..Default::default()
        };
        let out = lens_resample(&img, &geo, &DistortionLut::identity());
        assert_relative_eq!(out.pixel(0, 0)[0], img.pixel(16, 16)[0], epsilon = 1e-4);
        assert_relative_eq!(out.pixel(16, 0)[0], img.pixel(0, 16)[0], epsilon = 1e-4);
    }

    #[test]
    fn test_upscale_zooms_in() {
        let img = gradient_image(17, 17);
        let geo = LensGeometry {
            scale: 200.0,
            ..Default::default()
        };
        let out = lens_resample(&img, &geo, &DistortionLut::identity());
        // Center is a fixed point; the corner samples from halfway in.
        assert_relative_eq!(out.pixel(8, 8)[0], img.pixel(8, 8)[0], epsilon = 1e-4);
        assert_relative_eq!(out.pixel(0, 0)[0], img.pixel(4, 4)[0], epsilon = 1e-4);
    }

    #[test]
    fn test_out_of_bounds_is_black() {
        let img = gradient_image(16, 16);
        let geo = LensGeometry {
            offset_x: 30.0,
            ..Default::default()
        };
        let out = lens_resample(&img, &geo, &DistortionLut::identity());
        assert_eq!(out.pixel(0, 8)[0], 0.0);
    }

    #[test]
    fn test_distortion_moves_corners_not_center() {
        let img = gradient_image(33, 33);
        let lut = DistortionLut::build(DistortionModel::Poly5 { k1: -0.2, k2: 0.0 });
        let out = lens_resample(&img, &LensGeometry::default(), &lut);
        assert_relative_eq!(out.pixel(16, 16)[0], img.pixel(16, 16)[0], epsilon = 1e-3);
        let moved = (out.pixel(2, 2)[0] - img.pixel(2, 2)[0]).abs();
        assert!(moved > 1e-4, "corner did not move: {moved}");
    }

    #[test]
    fn test_lateral_ca_separates_channels() {
        let img = gradient_image(33, 33);
        let geo = LensGeometry {
            ca_red_cyan: 100.0,
            ..Default::default()
        };
        let out = lens_resample(&img, &geo, &DistortionLut::identity());
        // Green is untouched, red resamples from a scaled radius.
        assert_relative_eq!(out.pixel(2, 2)[1], img.pixel(2, 2)[1], epsilon = 1e-5);
    }
}
