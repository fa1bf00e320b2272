//! Color grading through the 3D L*C*h LUT.
//!
//! Pixels convert to cylindrical Lab, sample the prebuilt grading cube
//! with trilinear interpolation, and convert back. The conversions must be
//! the same functions the LUT builder used, otherwise a neutral cube would
//! not be an identity.

use rawdev_color::{lch_to_srgb, srgb_to_lch};
use rawdev_core::RgbImage;
use rawdev_lut::GradingLut;
use rayon::prelude::*;

use std::f32::consts::PI;

/// Applies the grading LUT in place.
pub fn color_grade(img: &mut RgbImage, lut: &GradingLut) {
    let w = img.width() as usize;
    let [r, g, b] = img.channels_mut();
    r.data_mut()
        .par_chunks_mut(w)
        .zip(g.data_mut().par_chunks_mut(w))
        .zip(b.data_mut().par_chunks_mut(w))
        .for_each(|((r_row, g_row), b_row)| {
            for i in 0..r_row.len() {
                let [l, c, h] = srgb_to_lch([r_row[i], g_row[i], b_row[i]]);
                let l_norm = (l / 100.0).clamp(0.0, 1.0);
                let c_norm = (c / 150.0).clamp(0.0, 1.0);
                let h_norm = ((h + PI) / (2.0 * PI)).clamp(0.0, 1.0);
                let graded = lut.sample(l_norm, c_norm, h_norm);
                let [nr, ng, nb] = lch_to_srgb(graded);
                r_row[i] = nr;
                g_row[i] = ng;
                b_row[i] = nb;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rawdev_lut::{GradingParams, Wheel};

    #[test]
    fn test_neutral_lut_is_near_identity() {
        let lut = GradingLut::build(&GradingParams::default());
        let mut img = RgbImage::new(2, 1);
        img.set_pixel(0, 0, [0.4, 0.3, 0.2]);
        img.set_pixel(1, 0, [0.05, 0.6, 0.8]);
        let before = [img.pixel(0, 0), img.pixel(1, 0)];
        color_grade(&mut img, &lut);
        for (x, orig) in before.iter().enumerate() {
            let after = img.pixel(x as u32, 0);
            for c in 0..3 {
                assert_relative_eq!(after[c], orig[c], epsilon = 0.02);
            }
        }
    }

    #[test]
    fn test_shadow_wheel_warms_shadows_only() {
        let params = GradingParams {
            shadows: Wheel {
                x: 0.4,
                y: 0.2,
                luma: 0.0,
            },
            ..Default::default()
        };
        let lut = GradingLut::build(&params);
        let mut img = RgbImage::new(2, 1);
        img.set_pixel(0, 0, [0.02, 0.02, 0.02]);
        img.set_pixel(1, 0, [0.9, 0.9, 0.9]);
        color_grade(&mut img, &lut);
        let dark = img.pixel(0, 0);
        let bright = img.pixel(1, 0);
        // Positive a* pushes the dark pixel toward red.
        assert!(dark[0] > dark[1], "dark pixel not warmed: {dark:?}");
        assert_relative_eq!(bright[0], bright[1], epsilon = 0.02);
    }

    #[test]
    fn test_blue_survives_grading() {
        // A saturated blue stays blue-dominant through a neutral grade.
        let lut = GradingLut::build(&GradingParams::default());
        let mut img = RgbImage::new(1, 1);
        img.set_pixel(0, 0, [50.0 / 65535.0, 50.0 / 65535.0, 100.0 / 65535.0]);
        color_grade(&mut img, &lut);
        let px = img.pixel(0, 0);
        assert!(px[2] > px[0] && px[2] > px[1], "hue family lost: {px:?}");
        assert!(px[0] < 200.0 / 65535.0);
        assert!(px[1] < 200.0 / 65535.0);
        assert!(px[2] < 400.0 / 65535.0);
    }
}
