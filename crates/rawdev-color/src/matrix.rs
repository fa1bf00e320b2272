//! Camera color matrix preparation and illuminant interpolation.
//!
//! RAW metadata carries two camera-to-sRGB 3x4 matrices calibrated at
//! roughly 3200 K and 7000 K. The pipeline blends them per request with a
//! mired-space weight, then applies the result right after demosaicing.

use rawdev_math::Mat3x4;

/// Low calibration illuminant in Kelvin.
pub const CALIB_LOW_K: f32 = 3200.0;
/// High calibration illuminant in Kelvin.
pub const CALIB_HIGH_K: f32 = 7000.0;

/// Normalizes the offset columns of a calibrated matrix pair.
///
/// The offset column is stored in the sensor integer domain; dividing by
/// `white - black` moves it into the [0, 1] float domain the pipeline works
/// in. The linear 3x3 part is unchanged.
pub fn normalize_offsets(matrix: &Mat3x4, black: u16, white: u16) -> Mat3x4 {
    let inv_range = if white > black {
        1.0 / (white as f32 - black as f32)
    } else {
        1.0
    };
    Mat3x4 {
        linear: matrix.linear,
        offset: matrix.offset * inv_range,
    }
}

/// Interpolation weight for a requested color temperature.
///
/// Mired-space blend: `alpha = (1/T - 1/3200) / (1/7000 - 1/3200)`, clamped
/// to [0, 1] so temperatures outside the calibration range pin to the
/// nearest calibrated matrix.
#[inline]
pub fn illuminant_weight(temp_k: f32) -> f32 {
    let alpha = (1.0 / temp_k - 1.0 / CALIB_LOW_K) / (1.0 / CALIB_HIGH_K - 1.0 / CALIB_LOW_K);
    alpha.clamp(0.0, 1.0)
}

/// Blends the calibrated matrix pair for a requested color temperature.
///
/// Returns `alpha * m_7000 + (1 - alpha) * m_3200` with the mired-space
/// weight from [`illuminant_weight`].
pub fn interpolate_matrix(m_3200: &Mat3x4, m_7000: &Mat3x4, temp_k: f32) -> Mat3x4 {
    m_3200.lerp(m_7000, illuminant_weight(temp_k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_pair() -> (Mat3x4, Mat3x4) {
        let low = Mat3x4::from_rows([
            [1.0, 0.0, 0.0, -40.0],
            [0.0, 1.0, 0.0, -40.0],
            [0.0, 0.0, 1.0, -40.0],
        ]);
        let high = Mat3x4::from_rows([
            [2.0, 0.0, 0.0, -20.0],
            [0.0, 2.0, 0.0, -20.0],
            [0.0, 0.0, 2.0, -20.0],
        ]);
        (low, high)
    }

    #[test]
    fn test_weight_at_calibration_points() {
        assert_relative_eq!(illuminant_weight(3200.0), 0.0);
        assert_relative_eq!(illuminant_weight(7000.0), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_weight_clamps_outside_range() {
        assert_eq!(illuminant_weight(1500.0), 0.0);
        assert_eq!(illuminant_weight(15000.0), 1.0);
    }

    #[test]
    fn test_interpolation_endpoints() {
        let (low, high) = test_pair();
        assert_eq!(interpolate_matrix(&low, &high, 3200.0), low);
        let at_high = interpolate_matrix(&low, &high, 7000.0);
        assert_relative_eq!(at_high.rows()[0][0], 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_mired_midpoint_is_not_kelvin_midpoint() {
        // Mired blending weights warm temperatures more heavily than a
        // linear Kelvin blend would.
        let w = illuminant_weight(5100.0);
        assert!(w > 0.5, "weight at 5100K: {w}");
    }

    #[test]
    fn test_normalize_offsets() {
        let (low, _) = test_pair();
        let norm = normalize_offsets(&low, 0, 4000);
        assert_relative_eq!(norm.offset.x, -0.01);
        assert_relative_eq!(norm.linear.col(0).x, 1.0);
    }

    #[test]
    fn test_normalize_offsets_degenerate_range() {
        let (low, _) = test_pair();
        let norm = normalize_offsets(&low, 100, 100);
        assert_relative_eq!(norm.offset.x, -40.0);
    }
}
