//! Level normalization and exposure compensation.

use rawdev_core::RgbImage;
use rayon::prelude::*;

/// Maps sensor-domain RGB into [0, 1] scene-linear values.
///
/// Subtracts the black level and scales so the white level lands on 1.0.
/// Values outside the sensor calibration range stay unclamped.
pub fn normalize_levels(img: &mut RgbImage, black: u16, white: u16) {
    let inv_range = 1.0 / (white as f32 - black as f32).max(1.0);
    let black = black as f32;
    for plane in img.channels_mut() {
        plane
            .data_mut()
            .par_iter_mut()
            .for_each(|v| *v = (*v - black) * inv_range);
    }
}

/// Multiplies all channels by `2^stops`.
///
/// The float pipeline does not clamp here; highlights beyond 1.0 stay
/// available to the later tone mapping.
pub fn exposure(img: &mut RgbImage, stops: f32) {
    if stops == 0.0 {
        return;
    }
    let factor = 2f32.powf(stops);
    for plane in img.channels_mut() {
        plane.data_mut().par_iter_mut().for_each(|v| *v *= factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_levels() {
        let mut img = RgbImage::new(2, 2);
        img.set_pixel(0, 0, [25.0, 2060.0, 4095.0]);
        normalize_levels(&mut img, 25, 4095);
        let px = img.pixel(0, 0);
        assert_relative_eq!(px[0], 0.0);
        assert_relative_eq!(px[1], 0.5, epsilon = 1e-3);
        assert_relative_eq!(px[2], 1.0);
    }

    #[test]
    fn test_exposure_two_stops() {
        let mut img = RgbImage::new(1, 1);
        img.set_pixel(0, 0, [0.1, 0.2, 0.3]);
        exposure(&mut img, 2.0);
        let px = img.pixel(0, 0);
        assert_relative_eq!(px[0], 0.4);
        assert_relative_eq!(px[1], 0.8);
        assert_relative_eq!(px[2], 1.2);
    }

    #[test]
    fn test_exposure_no_clamp() {
        let mut img = RgbImage::new(1, 1);
        img.set_pixel(0, 0, [0.9, 0.9, 0.9]);
        exposure(&mut img, 4.0);
        assert!(img.pixel(0, 0)[0] > 14.0);
    }

    #[test]
    fn test_negative_stops_darken() {
        let mut img = RgbImage::new(1, 1);
        img.set_pixel(0, 0, [0.8, 0.8, 0.8]);
        exposure(&mut img, -1.0);
        assert_relative_eq!(img.pixel(0, 0)[0], 0.4);
    }
}
