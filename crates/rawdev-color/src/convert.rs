//! Scene-linear sRGB ⇄ XYZ ⇄ CIE Lab ⇄ LCh conversions.
//!
//! Reference white is D65 (Xn = 0.95047, Yn = 1.0, Zn = 1.08883). Hue is
//! expressed in radians in [-pi, pi] and forced to 0 for near-achromatic
//! colors (C below 1e-5) so that gray pixels do not pick up arbitrary hue
//! from floating-point noise.

/// D65 reference white.
const XN: f32 = 0.95047;
const YN: f32 = 1.0;
const ZN: f32 = 1.08883;

/// Chroma threshold below which hue is pinned to 0.
pub const ACHROMATIC_EPS: f32 = 1e-5;

/// (6/29)^3, the linear/cubic switch point of the Lab transfer function.
const LAB_T_THRESH: f32 = 0.008_856_452;

/// 6/29, the switch point of the inverse transfer function.
const LAB_DELTA: f32 = 6.0 / 29.0;

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > LAB_T_THRESH {
        t.cbrt()
    } else {
        7.787_037 * t + 16.0 / 116.0
    }
}

#[inline]
fn lab_f_inv(t: f32) -> f32 {
    if t > LAB_DELTA {
        t * t * t
    } else {
        3.0 * LAB_DELTA * LAB_DELTA * (t - 16.0 / 116.0)
    }
}

/// Converts scene-linear sRGB to CIE XYZ (D65).
#[inline]
pub fn linear_srgb_to_xyz(rgb: [f32; 3]) -> [f32; 3] {
    let [r, g, b] = rgb;
    [
        0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b,
        0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b,
        0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b,
    ]
}

/// Converts CIE XYZ (D65) to scene-linear sRGB.
#[inline]
pub fn xyz_to_linear_srgb(xyz: [f32; 3]) -> [f32; 3] {
    let [x, y, z] = xyz;
    [
        3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z,
        -0.969_266_0 * x + 1.876_010_8 * y + 0.041_556_0 * z,
        0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z,
    ]
}

/// Converts CIE XYZ to CIE L*a*b*.
#[inline]
pub fn xyz_to_lab(xyz: [f32; 3]) -> [f32; 3] {
    let fx = lab_f(xyz[0] / XN);
    let fy = lab_f(xyz[1] / YN);
    let fz = lab_f(xyz[2] / ZN);
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Converts CIE L*a*b* to CIE XYZ.
#[inline]
pub fn lab_to_xyz(lab: [f32; 3]) -> [f32; 3] {
    let fy = (lab[0] + 16.0) / 116.0;
    let fx = lab[1] / 500.0 + fy;
    let fz = fy - lab[2] / 200.0;
    [lab_f_inv(fx) * XN, lab_f_inv(fy) * YN, lab_f_inv(fz) * ZN]
}

/// Converts L*a*b* to cylindrical LCh, hue in radians [-pi, pi].
///
/// Hue is 0 for near-achromatic colors (C < [`ACHROMATIC_EPS`]).
#[inline]
pub fn lab_to_lch(lab: [f32; 3]) -> [f32; 3] {
    let [l, a, b] = lab;
    let c = (a * a + b * b).sqrt();
    let h = if c > ACHROMATIC_EPS { b.atan2(a) } else { 0.0 };
    [l, c, h]
}

/// Converts cylindrical LCh back to L*a*b*.
#[inline]
pub fn lch_to_lab(lch: [f32; 3]) -> [f32; 3] {
    let [l, c, h] = lch;
    [l, c * h.cos(), c * h.sin()]
}

/// Converts scene-linear sRGB straight to LCh.
#[inline]
pub fn srgb_to_lch(rgb: [f32; 3]) -> [f32; 3] {
    lab_to_lch(xyz_to_lab(linear_srgb_to_xyz(rgb)))
}

/// Converts LCh straight to scene-linear sRGB.
#[inline]
pub fn lch_to_srgb(lch: [f32; 3]) -> [f32; 3] {
    xyz_to_linear_srgb(lab_to_xyz(lch_to_lab(lch)))
}
