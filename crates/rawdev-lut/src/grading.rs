//! 3D color-grading LUT in L*C*h space.
//!
//! The grading stage works in cylindrical Lab: lightness L* in [0, 100],
//! chroma C* in [0, 150], hue in radians [-pi, pi]. Rather than evaluating
//! five curves and three color wheels per pixel, the host bakes them into a
//! 33x33x33 cube that the stage samples with trilinear interpolation.
//!
//! The producer's loop order matches the memory layout: L is dimension 0
//! and iterates innermost, then C, then h.

use rawdev_math::{lerp, smoothstep, CurvePoint, Endpoints, Spline};

/// Grid resolution per axis.
pub const GRADING_LUT_SIZE: usize = 33;

/// Physical chroma ceiling of the grading domain.
pub const CHROMA_MAX: f32 = 150.0;

/// Sensitivity of the color wheels in a*/b* units per unit of wheel travel.
const WHEEL_SCALE: f32 = 50.0;

/// A color wheel: a 2D offset in a*/b* plus a luminance trim.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Wheel {
    /// a* offset direction, in [-1, 1].
    pub x: f32,
    /// b* offset direction, in [-1, 1].
    pub y: f32,
    /// Luminance trim in [-100, 100].
    pub luma: f32,
}

/// Inputs to the grading LUT: five curves and three wheels.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradingParams<'a> {
    /// Hue shift per hue, additive, scaled to +/- 180 degrees.
    pub hue_vs_hue: &'a [CurvePoint],
    /// Chroma multiplier per hue.
    pub hue_vs_sat: &'a [CurvePoint],
    /// Lightness offset per hue, additive, scaled to +/- 100 L*.
    pub hue_vs_lum: &'a [CurvePoint],
    /// Chroma multiplier per lightness.
    pub lum_vs_sat: &'a [CurvePoint],
    /// Chroma remap curve (identity by default).
    pub sat_vs_sat: &'a [CurvePoint],
    /// Shadow / midtone / highlight wheels.
    pub shadows: Wheel,
    pub midtones: Wheel,
    pub highlights: Wheel,
}

/// N x N x N x 3 grading cube mapping (L*, C*norm, h_norm) to (L'*, C'*, h'*).
#[derive(Debug, Clone)]
pub struct GradingLut {
    data: Vec<[f32; 3]>,
    size: usize,
}

impl GradingLut {
    /// Bakes the grading LUT from curves and wheels.
    pub fn build(params: &GradingParams<'_>) -> Self {
        Self::build_sized(params, GRADING_LUT_SIZE)
    }

    /// Bakes the grading LUT at an explicit grid resolution.
    pub fn build_sized(params: &GradingParams<'_>, size: usize) -> Self {
        let h_v_h = Spline::monotone(params.hue_vs_hue, Endpoints::Zero);
        let h_v_s = Spline::monotone(params.hue_vs_sat, Endpoints::One);
        let h_v_l = Spline::monotone(params.hue_vs_lum, Endpoints::Zero);
        let l_v_s = Spline::monotone(params.lum_vs_sat, Endpoints::One);
        let s_v_s = Spline::monotone(params.sat_vs_sat, Endpoints::Unit);

        let mut data = vec![[0.0f32; 3]; size * size * size];
        let inv = 1.0 / (size - 1) as f32;

        // Loop order must match memory layout: L (dim 0) innermost.
        for h_i in 0..size {
            let h_norm = h_i as f32 * inv;
            let hue_shift = h_v_h.evaluate(h_norm) * std::f32::consts::PI;
            let hue_sat = h_v_s.evaluate(h_norm);
            let hue_lum = h_v_l.evaluate(h_norm) * 100.0;
            for c_i in 0..size {
                let c_norm = c_i as f32 * inv;
                let c_phys = c_norm * CHROMA_MAX;
                for l_i in 0..size {
                    let l_norm = l_i as f32 * inv;
                    let l_phys = l_norm * 100.0;
                    let h_rads = h_norm * 2.0 * std::f32::consts::PI - std::f32::consts::PI;

                    let mut l_out = l_phys + hue_lum;
                    let h_out = h_rads + hue_shift;
                    let mut c_out = c_phys * hue_sat;
                    c_out *= l_v_s.evaluate(l_norm);
                    c_out = s_v_s.evaluate(c_out / CHROMA_MAX) * CHROMA_MAX;

                    // Wheels act in a*/b*, weighted by lightness-band masks.
                    let mut a = c_out * h_out.cos();
                    let mut b = c_out * h_out.sin();

                    let luma_norm = l_out / 100.0;
                    let shadow_w = 1.0 - smoothstep(0.0, 0.5, luma_norm);
                    let hi_w = smoothstep(0.5, 1.0, luma_norm);
                    let mid_w = 1.0 - shadow_w - hi_w;

                    a += (params.shadows.x * shadow_w
                        + params.midtones.x * mid_w
                        + params.highlights.x * hi_w)
                        * WHEEL_SCALE;
                    b += (params.shadows.y * shadow_w
                        + params.midtones.y * mid_w
                        + params.highlights.y * hi_w)
                        * WHEEL_SCALE;

                    l_out *= 1.0 + params.shadows.luma / 100.0 * shadow_w;
                    l_out *= 1.0 + params.midtones.luma / 100.0 * mid_w;
                    l_out *= 1.0 + params.highlights.luma / 100.0 * hi_w;

                    let c_final = (a * a + b * b).sqrt();
                    let h_final = if c_final > 1e-5 { b.atan2(a) } else { 0.0 };

                    data[(h_i * size + c_i) * size + l_i] = [l_out, c_final, h_final];
                }
            }
        }

        Self { data, size }
    }

    /// Grid resolution per axis.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn get(&self, l: usize, c: usize, h: usize) -> [f32; 3] {
        self.data[(h * self.size + c) * self.size + l]
    }

    /// Trilinear sample at normalized (L, C, h) coordinates in [0, 1].
    ///
    /// Out-of-range coordinates clamp to the cube edge.
    pub fn sample(&self, l_norm: f32, c_norm: f32, h_norm: f32) -> [f32; 3] {
        let n = self.size - 1;
        let lf = l_norm.clamp(0.0, 1.0) * n as f32;
        let cf = c_norm.clamp(0.0, 1.0) * n as f32;
        let hf = h_norm.clamp(0.0, 1.0) * n as f32;

        let li = (lf.floor() as usize).min(n);
        let ci = (cf.floor() as usize).min(n);
        let hi = (hf.floor() as usize).min(n);
        let li1 = (li + 1).min(n);
        let ci1 = (ci + 1).min(n);
        let hi1 = (hi + 1).min(n);

        let ld = lf - li as f32;
        let cd = cf - ci as f32;
        let hd = hf - hi as f32;

        let mut out = [0.0f32; 3];
        for (ch, slot) in out.iter_mut().enumerate() {
            let c000 = self.get(li, ci, hi)[ch];
            let c100 = self.get(li1, ci, hi)[ch];
            let c010 = self.get(li, ci1, hi)[ch];
            let c110 = self.get(li1, ci1, hi)[ch];
            let c001 = self.get(li, ci, hi1)[ch];
            let c101 = self.get(li1, ci, hi1)[ch];
            let c011 = self.get(li, ci1, hi1)[ch];
            let c111 = self.get(li1, ci1, hi1)[ch];

            let c00 = lerp(c000, c100, ld);
            let c01 = lerp(c001, c101, ld);
            let c10 = lerp(c010, c110, ld);
            let c11 = lerp(c011, c111, ld);

            let c0 = lerp(c00, c10, cd);
            let c1 = lerp(c01, c11, cd);

            *slot = lerp(c0, c1, hd);
        }
        out
    }
}
