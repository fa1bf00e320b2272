//! Inverse lens-distortion LUT.
//!
//! Radial distortion models map an undistorted radius `r_u` to the
//! distorted radius `r_d` the lens actually projected. The resampler pulls
//! pixels the other way, so the host inverts the model numerically into a
//! 2048-entry table indexed by squared normalized distorted radius and
//! storing the scale factor `r_u / r_d`. POLY3 has a closed-form inverse
//! (Cardano); POLY5 and PTLENS use four Newton-Raphson iterations from the
//! initial guess `r_u = r_d`.

/// Number of table entries.
pub const DISTORTION_LUT_SIZE: usize = 2048;

/// Largest squared normalized radius the table covers.
pub const MAX_RD_SQUARED_NORM: f32 = 3.0;

/// Radial distortion model with resolved terms.
///
/// Manual `k1/k2` parameters map to [`DistortionModel::Poly5`]; profile
/// databases resolve to whichever model the lens was calibrated with.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DistortionModel {
    /// No distortion correction.
    #[default]
    None,
    /// `r_d = r_u * (1 - k1 + k1 * r_u^2)`
    Poly3 { k1: f32 },
    /// `r_d = r_u * (1 + k1 * r_u^2 + k2 * r_u^4)`
    Poly5 { k1: f32, k2: f32 },
    /// `r_d = r_u * (a * r_u^3 + b * r_u^2 + c * r_u + 1 - a - b - c)`
    Ptlens { a: f32, b: f32, c: f32 },
}

/// 1D inverse-distortion table: squared normalized radius -> `r_u / r_d`.
#[derive(Debug, Clone)]
pub struct DistortionLut {
    data: Vec<f32>,
    identity: bool,
}

impl DistortionLut {
    /// Builds the identity table (all ones).
    pub fn identity() -> Self {
        Self {
            data: vec![1.0; DISTORTION_LUT_SIZE],
            identity: true,
        }
    }

    /// Builds the inverse table for a distortion model.
    pub fn build(model: DistortionModel) -> Self {
        match model {
            DistortionModel::None => Self::identity(),
            DistortionModel::Poly3 { k1 } if k1.abs() <= 1e-6 => Self::identity(),
            _ => {
                let mut data = vec![1.0f32; DISTORTION_LUT_SIZE];
                for (i, slot) in data.iter_mut().enumerate() {
                    let rd_sq_norm =
                        i as f32 * MAX_RD_SQUARED_NORM / (DISTORTION_LUT_SIZE - 1) as f32;
                    let rd = rd_sq_norm.sqrt();
                    let ru = match model {
                        DistortionModel::None => rd,
                        DistortionModel::Poly3 { k1 } => {
                            solve_cubic_poly3((1.0 - k1) / k1, -rd / k1)
                        }
                        DistortionModel::Poly5 { k1, k2 } => solve_poly5(k1, k2, rd),
                        DistortionModel::Ptlens { a, b, c } => solve_ptlens(a, b, c, rd),
                    };
                    *slot = if rd > 1e-5 { ru / rd } else { 1.0 };
                }
                Self {
                    data,
                    identity: false,
                }
            }
        }
    }

    /// Returns `true` when the table encodes no correction.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Samples `r_u / r_d` by squared normalized radius.
    ///
    /// Linear interpolation between entries; indices clamp to the table.
    #[inline]
    pub fn sample(&self, rd_sq_norm: f32) -> f32 {
        let n = self.data.len();
        let idx_f =
            (rd_sq_norm / MAX_RD_SQUARED_NORM).clamp(0.0, 1.0) * (n - 1) as f32;
        let i0 = idx_f.floor() as usize;
        let i1 = (i0 + 1).min(n - 1);
        let w = idx_f - i0 as f32;
        self.data[i0] * (1.0 - w) + self.data[i1] * w
    }
}

/// Solves the depressed cubic `r_u^3 + p*r_u + q = 0` (Cardano).
///
/// Returns the single positive real root; one always exists for physical
/// distortion parameters.
fn solve_cubic_poly3(p: f32, q: f32) -> f32 {
    let p_3 = p / 3.0;
    let q_2 = q / 2.0;
    let discriminant = q_2 * q_2 + p_3 * p_3 * p_3;

    if discriminant >= 0.0 {
        let root = discriminant.sqrt();
        (-q_2 + root).cbrt() + (-q_2 - root).cbrt()
    } else {
        let r = (-p_3 * -p_3 * -p_3).sqrt();
        let phi = (-q_2 / r).acos();
        2.0 * (-p_3).sqrt() * (phi / 3.0).cos()
    }
}

/// Newton-Raphson inverse of `f(r_u) = k2*r_u^5 + k1*r_u^3 + r_u - r_d`.
fn solve_poly5(k1: f32, k2: f32, rd: f32) -> f32 {
    let mut ru = rd;
    for _ in 0..4 {
        let ru2 = ru * ru;
        let ru3 = ru2 * ru;
        let ru4 = ru2 * ru2;
        let f = k2 * ru4 * ru + k1 * ru3 + ru - rd;
        let f_prime = 5.0 * k2 * ru4 + 3.0 * k1 * ru2 + 1.0;
        if f_prime.abs() < 1e-6 {
            break;
        }
        ru -= f / f_prime;
    }
    ru
}

/// Newton-Raphson inverse of the PTLENS quartic.
fn solve_ptlens(a: f32, b: f32, c: f32, rd: f32) -> f32 {
    let d = 1.0 - a - b - c;
    let mut ru = rd;
    for _ in 0..4 {
        let ru2 = ru * ru;
        let ru3 = ru2 * ru;
        let ru4 = ru2 * ru2;
        let f = a * ru4 + b * ru3 + c * ru2 + d * ru - rd;
        let f_prime = 4.0 * a * ru3 + 3.0 * b * ru2 + 2.0 * c * ru + d;
        if f_prime.abs() < 1e-6 {
            break;
        }
        ru -= f / f_prime;
    }
    ru
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_lut() {
        let lut = DistortionLut::identity();
        assert!(lut.is_identity());
        assert_eq!(lut.sample(0.0), 1.0);
        assert_eq!(lut.sample(2.9), 1.0);
    }

    #[test]
    fn test_none_and_tiny_k1_are_identity() {
        assert!(DistortionLut::build(DistortionModel::None).is_identity());
        assert!(DistortionLut::build(DistortionModel::Poly3 { k1: 1e-9 }).is_identity());
    }

    #[test]
    fn test_poly3_forward_inverse_roundtrip() {
        let k1 = 0.05;
        let lut = DistortionLut::build(DistortionModel::Poly3 { k1 });
        assert!(!lut.is_identity());
        for rd_sq in [0.1f32, 0.5, 1.0, 2.0] {
            let rd = rd_sq.sqrt();
            let ru = rd * lut.sample(rd_sq);
            // Forward model: r_d = r_u * (1 - k1 + k1 * r_u^2)
            let rd_back = ru * (1.0 - k1 + k1 * ru * ru);
            assert_relative_eq!(rd_back, rd, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_poly5_forward_inverse_roundtrip() {
        let (k1, k2) = (-0.03, 0.005);
        let lut = DistortionLut::build(DistortionModel::Poly5 { k1, k2 });
        for rd_sq in [0.2f32, 0.8, 1.5] {
            let rd = rd_sq.sqrt();
            let ru = rd * lut.sample(rd_sq);
            let rd_back = ru * (1.0 + k1 * ru * ru + k2 * ru.powi(4));
            assert_relative_eq!(rd_back, rd, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_ptlens_forward_inverse_roundtrip() {
        let (a, b, c) = (0.01, -0.02, 0.015);
        let lut = DistortionLut::build(DistortionModel::Ptlens { a, b, c });
        for rd_sq in [0.3f32, 1.0, 2.5] {
            let rd = rd_sq.sqrt();
            let ru = rd * lut.sample(rd_sq);
            let d = 1.0 - a - b - c;
            let rd_back = a * ru.powi(4) + b * ru.powi(3) + c * ru * ru + d * ru;
            assert_relative_eq!(rd_back, rd, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_barrel_distortion_expands_radius() {
        // Positive k1 barrel distortion compresses the projected radius, so
        // the inverse scale must exceed 1 away from the center.
        let lut = DistortionLut::build(DistortionModel::Poly5 { k1: 0.1, k2: 0.0 });
        assert!(lut.sample(1.0) < 1.0);
        let lut = DistortionLut::build(DistortionModel::Poly5 { k1: -0.1, k2: 0.0 });
        assert!(lut.sample(1.0) > 1.0);
    }

    #[test]
    fn test_table_center_is_one() {
        let lut = DistortionLut::build(DistortionModel::Poly3 { k1: 0.1 });
        assert_relative_eq!(lut.sample(0.0), 1.0, epsilon = 1e-4);
    }
}
