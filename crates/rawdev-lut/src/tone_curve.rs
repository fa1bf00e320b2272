//! Tone-curve LUT generation.
//!
//! The pipeline's final stage is a straight table lookup: a 65 536-entry,
//! 3-channel `u16` table whose upper byte is the finished 8-bit display
//! value. The table is built per request from the user's curve points
//! through the monotone Hermite spline, with a per-channel fallback chain:
//! channel curve, else master luma curve, else a generated S-curve from the
//! `contrast` setting.
//!
//! The pipeline variant pre-transforms the linear input by `x^(1/gamma)`
//! before the spline so that user curves operate in display-gamma space;
//! the preview variant skips the gamma step and maps linear to linear.

use rawdev_math::{CurvePoint, Endpoints, Spline};

/// Number of entries per channel.
pub const TONE_LUT_SIZE: usize = 65536;

/// The curve sources feeding the tone-curve LUT.
///
/// Empty slices mean "not set"; the fallback chain picks the replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToneCurves<'a> {
    /// Master luma curve, used for channels without their own curve.
    pub luma: &'a [CurvePoint],
    /// Per-channel overrides.
    pub r: &'a [CurvePoint],
    /// Green channel override.
    pub g: &'a [CurvePoint],
    /// Blue channel override.
    pub b: &'a [CurvePoint],
}

/// 65 536 x 3 `u16` tone-curve table.
///
/// Stored as three contiguous channel blocks (R, G, B). The upper byte of
/// each entry encodes the final 8-bit display value.
#[derive(Debug, Clone)]
pub struct ToneCurveLut {
    data: Vec<u16>,
}

impl ToneCurveLut {
    /// Builds the tone-curve LUT.
    ///
    /// `base_tonemap` selects the pipeline variant (gamma pre-transform) or
    /// the linear preview variant. `black`/`white` define the input domain:
    /// indices at or below `black` map to 0, indices at or above `white`
    /// map to full scale. The pipeline driver passes (0, 65535) because the
    /// image has been normalized upstream; the raw-preview path passes the
    /// sensor levels directly.
    pub fn build(
        curves: &ToneCurves<'_>,
        contrast: f32,
        gamma: f32,
        base_tonemap: bool,
        black: u16,
        white: u16,
    ) -> Self {
        let mut data = vec![0u16; TONE_LUT_SIZE * 3];

        let sources = [
            pick_channel(curves.r, curves.luma),
            pick_channel(curves.g, curves.luma),
            pick_channel(curves.b, curves.luma),
        ];
        for (c, source) in sources.iter().enumerate() {
            let out = &mut data[c * TONE_LUT_SIZE..(c + 1) * TONE_LUT_SIZE];
            generate_channel(source, contrast, gamma, base_tonemap, black, white, out);
        }

        Self { data }
    }

    /// Returns the `u16` entry for input `i` on channel `c`.
    #[inline]
    pub fn value(&self, i: u16, c: usize) -> u16 {
        self.data[c * TONE_LUT_SIZE + i as usize]
    }

    /// Returns the final 8-bit display value for input `i` on channel `c`.
    #[inline]
    pub fn final_u8(&self, i: u16, c: usize) -> u8 {
        (self.value(i, c) >> 8) as u8
    }
}

#[inline]
fn pick_channel<'a>(own: &'a [CurvePoint], luma: &'a [CurvePoint]) -> &'a [CurvePoint] {
    if !own.is_empty() {
        own
    } else {
        luma
    }
}

/// Fills one channel of the LUT.
///
/// An empty point list produces the default S-curve derived from
/// `contrast`; otherwise the points go through the monotone spline.
fn generate_channel(
    points: &[CurvePoint],
    contrast: f32,
    gamma: f32,
    base_tonemap: bool,
    black: u16,
    white: u16,
    out: &mut [u16],
) {
    let range = (white as f32 - black as f32).max(1.0);
    let inv_gamma = 1.0 / gamma;

    let to_domain = |i: usize| -> f32 {
        let linear = ((i as f32 - black as f32) / range).clamp(0.0, 1.0);
        if base_tonemap {
            linear.powf(inv_gamma)
        } else {
            linear
        }
    };

    if points.is_empty() {
        // Default S-curve: strength follows the contrast slider.
        let b = 2.0 - 2f32.powf(contrast / 100.0);
        let a = 2.0 - 2.0 * b;
        for (i, slot) in out.iter_mut().enumerate() {
            let t = to_domain(i);
            let v = if t > 0.5 {
                1.0 - (a * (1.0 - t) * (1.0 - t) + b * (1.0 - t))
            } else {
                a * t * t + b * t
            };
            *slot = quantize(v);
        }
        return;
    }

    let spline = Spline::monotone(points, Endpoints::Unit);
    let mut cursor = spline.cursor();
    for (i, slot) in out.iter_mut().enumerate() {
        // to_domain is non-decreasing in i, so the cursor walk is valid.
        let v = cursor.eval(to_domain(i));
        *slot = quantize(v);
    }
}

#[inline]
fn quantize(v: f32) -> u16 {
    (v * 65535.0 + 0.5).clamp(0.0, 65535.0) as u16
}

/// Builds a luma curve by averaging the three channel curves.
///
/// Takes the union of x-coordinates across R/G/B and averages the three
/// evaluated y's at each x. Channels without a curve evaluate as identity.
pub fn average_rgb_to_luma(
    r: &[CurvePoint],
    g: &[CurvePoint],
    b: &[CurvePoint],
) -> Vec<CurvePoint> {
    let mut xs: Vec<f32> = r
        .iter()
        .chain(g.iter())
        .chain(b.iter())
        .map(|p| p.x)
        .collect();
    xs.sort_by(f32::total_cmp);
    xs.dedup();

    let splines = [
        Spline::monotone(r, Endpoints::Unit),
        Spline::monotone(g, Endpoints::Unit),
        Spline::monotone(b, Endpoints::Unit),
    ];

    xs.into_iter()
        .map(|x| {
            let sum: f32 = splines.iter().map(|s| s.evaluate(x)).sum();
            CurvePoint::new(x, sum / 3.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_range_curves<'a>() -> ToneCurves<'a> {
        ToneCurves::default()
    }

    #[test]
    fn test_linear_preview_is_identity() {
        let linear = [CurvePoint::new(0.0, 0.0), CurvePoint::new(1.0, 1.0)];
        let curves = ToneCurves {
            luma: &linear,
            ..Default::default()
        };
        let lut = ToneCurveLut::build(&curves, 50.0, 2.2, false, 0, 65535);
        for i in [0u16, 255, 4096, 32768, 65535] {
            let v = lut.value(i, 1);
            assert!(
                (v as i32 - i as i32).abs() <= 1,
                "lut[{i}] = {v}, expected ~{i}"
            );
        }
        assert_eq!(lut.final_u8(65535, 0), 255);
        assert_eq!(lut.final_u8(0, 2), 0);
    }

    #[test]
    fn test_inverting_curve() {
        let inv = [CurvePoint::new(0.0, 1.0), CurvePoint::new(1.0, 0.0)];
        let curves = ToneCurves {
            luma: &inv,
            ..Default::default()
        };
        let lut = ToneCurveLut::build(&curves, 50.0, 2.2, false, 0, 65535);
        for i in [0u16, 1000, 32768, 65535] {
            let v = lut.value(i, 0) as i32;
            let expected = 65535 - i as i32;
            assert!((v - expected).abs() <= 2, "lut[{i}] = {v}");
        }
    }

    #[test]
    fn test_default_s_curve_with_sensor_levels() {
        // Raw-preview domain: black 25, white 4095.
        let lut = ToneCurveLut::build(&full_range_curves(), 50.0, 2.2, true, 25, 4095);
        assert!(lut.value(4095, 1) >= 65533, "white: {}", lut.value(4095, 1));
        assert!(lut.value(25, 1) <= 2, "black: {}", lut.value(25, 1));
        let mid = lut.value((25 + 4095) / 2, 1);
        assert!(
            (10_000..55_000).contains(&mid),
            "midpoint maps to {mid}"
        );
        // Everything above white pins to full scale.
        assert!(lut.value(65535, 1) >= 65533);
    }

    #[test]
    fn test_channel_fallback_chain() {
        let luma = [CurvePoint::new(0.0, 0.0), CurvePoint::new(1.0, 0.5)];
        let red = [CurvePoint::new(0.0, 0.0), CurvePoint::new(1.0, 1.0)];
        let curves = ToneCurves {
            luma: &luma,
            r: &red,
            ..Default::default()
        };
        let lut = ToneCurveLut::build(&curves, 50.0, 2.2, false, 0, 65535);
        // R uses its own curve, G falls back to the halved luma curve.
        assert!(lut.value(65535, 0) > 65000);
        assert!((lut.value(65535, 1) as i32 - 32768).abs() < 200);
    }

    #[test]
    fn test_base_tonemap_brightens_midtones() {
        let linear = [CurvePoint::new(0.0, 0.0), CurvePoint::new(1.0, 1.0)];
        let curves = ToneCurves {
            luma: &linear,
            ..Default::default()
        };
        let with = ToneCurveLut::build(&curves, 50.0, 2.2, true, 0, 65535);
        let without = ToneCurveLut::build(&curves, 50.0, 2.2, false, 0, 65535);
        assert!(with.value(8192, 0) > without.value(8192, 0));
    }

    #[test]
    fn test_lut_is_monotone() {
        let pts = [
            CurvePoint::new(0.25, 0.1),
            CurvePoint::new(0.5, 0.6),
            CurvePoint::new(0.75, 0.7),
        ];
        let curves = ToneCurves {
            luma: &pts,
            ..Default::default()
        };
        let lut = ToneCurveLut::build(&curves, 50.0, 2.2, true, 0, 65535);
        let mut prev = 0u16;
        for i in (0..65536usize).step_by(37) {
            let v = lut.value(i as u16, 0);
            assert!(v >= prev, "non-monotone at {i}");
            prev = v;
        }
    }

    #[test]
    fn test_average_rgb_to_luma() {
        let r = [CurvePoint::new(0.5, 0.8)];
        let avg = average_rgb_to_luma(&r, &[], &[]);
        assert_eq!(avg.len(), 1);
        assert_eq!(avg[0].x, 0.5);
        // (0.8 + 0.5 + 0.5) / 3, the empty channels evaluating as identity.
        assert!((avg[0].y - 0.6).abs() < 1e-5);
    }
}
