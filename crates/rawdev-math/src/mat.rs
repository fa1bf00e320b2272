//! 3x4 color matrices: a 3x3 linear part plus an offset column.
//!
//! RAW metadata carries camera-to-sRGB matrices as 3 rows of 4 values; the
//! fourth column is an offset in the sensor integer domain and must be
//! normalized by the sensor range before it is applied to float data.

use glam::{Mat3, Vec3};

/// A 3x4 color matrix: `out = linear * in + offset * offset_scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3x4 {
    /// The 3x3 linear part.
    pub linear: Mat3,
    /// The offset column, in the sensor integer domain.
    pub offset: Vec3,
}

impl Mat3x4 {
    /// The identity matrix with zero offset.
    pub const IDENTITY: Self = Self {
        linear: Mat3::IDENTITY,
        offset: Vec3::ZERO,
    };

    /// Builds from three rows of `[m0, m1, m2, offset]`.
    pub fn from_rows(rows: [[f32; 4]; 3]) -> Self {
        let linear = Mat3::from_cols_array_2d(&[
            [rows[0][0], rows[1][0], rows[2][0]],
            [rows[0][1], rows[1][1], rows[2][1]],
            [rows[0][2], rows[1][2], rows[2][2]],
        ]);
        let offset = Vec3::new(rows[0][3], rows[1][3], rows[2][3]);
        Self { linear, offset }
    }

    /// Builds from a 3x3 linear part with zero offset.
    pub fn from_linear(linear: Mat3) -> Self {
        Self {
            linear,
            offset: Vec3::ZERO,
        }
    }

    /// Returns the rows as `[m0, m1, m2, offset]`.
    pub fn rows(&self) -> [[f32; 4]; 3] {
        let m = self.linear.to_cols_array_2d();
        [
            [m[0][0], m[1][0], m[2][0], self.offset.x],
            [m[0][1], m[1][1], m[2][1], self.offset.y],
            [m[0][2], m[1][2], m[2][2], self.offset.z],
        ]
    }

    /// Applies the matrix to an RGB triple.
    ///
    /// `offset_scale` normalizes the integer-domain offset column into the
    /// working domain (pass `1 / (white - black)` for [0,1] float data).
    #[inline]
    pub fn apply(&self, rgb: [f32; 3], offset_scale: f32) -> [f32; 3] {
        let v = self.linear * Vec3::from_array(rgb) + self.offset * offset_scale;
        v.to_array()
    }

    /// Linear blend between two matrices: `self * (1 - t) + other * t`.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            linear: self.linear * (1.0 - t) + other.linear * t,
            offset: self.offset.lerp(other.offset, t),
        }
    }
}
