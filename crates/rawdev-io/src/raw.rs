//! Decoded RAW image with normalized sensor metadata.
//!
//! Matrix priority follows the usual RAW workflow: an image-embedded
//! XYZ-to-camera matrix is inverted and converted to camera-to-sRGB; a
//! database camera-to-XYZ matrix converts directly; with neither, a pair of
//! fallback DNG camera-to-sRGB matrices (calibrated near 3200 K and
//! 7000 K) takes over.

use glam::Mat3;
use rawdev_core::{CfaPattern, Error, Plane, Result};
use rawdev_math::Mat3x4;

/// Fallback DNG camera-to-sRGB matrix calibrated near 3200 K.
pub const DEFAULT_MATRIX_3200: [[f32; 4]; 3] = [
    [1.6697, -0.2693, -0.4004, -42.4346],
    [-0.3576, 1.0615, 1.5949, -37.1158],
    [-0.2175, -1.8751, 6.9640, -26.6970],
];

/// Fallback DNG camera-to-sRGB matrix calibrated near 7000 K.
pub const DEFAULT_MATRIX_7000: [[f32; 4]; 3] = [
    [2.2997, -0.4478, 0.1706, -39.0923],
    [-0.3826, 1.5906, -0.2080, -25.4311],
    [-0.0888, -0.7344, 2.2832, -20.0826],
];

/// XYZ (D65) to linear sRGB.
const XYZ_TO_SRGB_D65: [[f32; 3]; 3] = [
    [3.240_454_2, -1.537_138_5, -0.498_531_4],
    [-0.969_266_0, 1.876_010_8, 0.041_556_0],
    [0.055_643_4, -0.204_025_9, 1.057_225_2],
];

/// A decoded Bayer mosaic with its sensor metadata.
#[derive(Debug, Clone)]
pub struct RawImage {
    /// The sensor mosaic.
    pub bayer: Plane<u16>,
    /// CFA layout of the top-left quad.
    pub pattern: CfaPattern,
    /// Black level in sensor counts.
    pub black: u16,
    /// White level in sensor counts.
    pub white: u16,
    /// Camera-to-sRGB matrix near 3200 K.
    pub matrix_3200: Mat3x4,
    /// Camera-to-sRGB matrix near 7000 K.
    pub matrix_7000: Mat3x4,
    /// Whether the matrices came from real metadata (vs the DNG fallback).
    pub has_matrix: bool,
}

impl RawImage {
    /// Wraps a decoded mosaic with the fallback DNG matrices.
    ///
    /// # Errors
    ///
    /// Rejects empty planes and `black >= white`.
    pub fn new(bayer: Plane<u16>, pattern: CfaPattern, black: u16, white: u16) -> Result<Self> {
        let (w, h) = bayer.dimensions();
        if bayer.is_empty() {
            return Err(Error::invalid_dimensions(w, h, "empty bayer plane"));
        }
        if black >= white {
            return Err(Error::other(format!(
                "black level {black} must be below white level {white}"
            )));
        }
        Ok(Self {
            bayer,
            pattern,
            black,
            white,
            matrix_3200: Mat3x4::from_rows(DEFAULT_MATRIX_3200),
            matrix_7000: Mat3x4::from_rows(DEFAULT_MATRIX_7000),
            has_matrix: false,
        })
    }

    /// Wraps a decoded mosaic that carries an XYZ-to-camera matrix.
    ///
    /// The matrix is inverted and converted to camera-to-sRGB, which then
    /// serves both illuminant slots with zero offsets. A singular matrix
    /// falls back to the DNG defaults.
    pub fn with_xyz_to_cam(
        bayer: Plane<u16>,
        pattern: CfaPattern,
        black: u16,
        white: u16,
        xyz_to_cam: [[f32; 3]; 3],
    ) -> Result<Self> {
        let mut raw = Self::new(bayer, pattern, black, white)?;

        let m = Mat3::from_cols_array_2d(&transpose(xyz_to_cam));
        if m.determinant().abs() < 1e-8 {
            tracing::warn!("singular camera matrix, using DNG fallback");
            return Ok(raw);
        }
        let cam_to_xyz = m.inverse();
        let cam_to_srgb =
            Mat3::from_cols_array_2d(&transpose(XYZ_TO_SRGB_D65)) * cam_to_xyz;

        let matrix = Mat3x4::from_linear(cam_to_srgb);
        raw.matrix_3200 = matrix;
        raw.matrix_7000 = matrix;
        raw.has_matrix = true;
        Ok(raw)
    }

    /// Wraps a decoded mosaic with an explicit camera-to-sRGB matrix pair.
    pub fn with_matrices(
        bayer: Plane<u16>,
        pattern: CfaPattern,
        black: u16,
        white: u16,
        matrix_3200: Mat3x4,
        matrix_7000: Mat3x4,
    ) -> Result<Self> {
        let mut raw = Self::new(bayer, pattern, black, white)?;
        raw.matrix_3200 = matrix_3200;
        raw.matrix_7000 = matrix_7000;
        raw.has_matrix = true;
        Ok(raw)
    }

    /// Returns the mosaic dimensions.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.bayer.dimensions()
    }
}

/// Row-major to glam's column-major array form.
fn transpose(rows: [[f32; 3]; 3]) -> [[f32; 3]; 3] {
    let mut cols = [[0.0f32; 3]; 3];
    for (i, row) in rows.iter().enumerate() {
        for (j, v) in row.iter().enumerate() {
            cols[j][i] = *v;
        }
    }
    cols
}
