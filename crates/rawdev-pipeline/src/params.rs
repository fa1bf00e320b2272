//! The parameter record: every knob of one render request.
//!
//! All fields have defaults and every default is an identity operation
//! (the default contrast still produces the stock S-curve when no explicit
//! curve is given, matching the usual RAW-developer baseline). Validation
//! clamps out-of-range scalars to their documented range, collecting a
//! warning per clamp; curve points with out-of-order x-coordinates are the
//! one unrecoverable parameter error.

use rawdev_lut::DistortionModel;
use rawdev_math::{is_x_monotone, CurvePoint};
use rawdev_ops::DemosaicAlgorithm;
use serde::{Deserialize, Serialize};

use crate::{PipelineError, PipelineResult};

/// Which curve set drives the tone-curve LUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveMode {
    /// Master luma curve only; per-channel curves are ignored.
    Luma,
    /// Per-channel curves with luma fallback.
    #[default]
    Rgb,
}

/// A color wheel: direction in the a*/b* plane plus a luminance trim.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelParams {
    /// a* direction in [-1, 1].
    pub x: f32,
    /// b* direction in [-1, 1].
    pub y: f32,
    /// Luminance trim in [-100, 100].
    pub luma: f32,
}

/// Which denoise kernel runs on the Bayer plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DenoiseMethod {
    /// Variance-stabilized guided filter (fast, the default).
    #[default]
    Guided,
    /// Non-local means (slower, better on fine texture).
    Nlmeans,
}

/// A resolved lens-distortion profile.
///
/// Hosts that look up lens databases resolve a profile name into one of
/// these; manual correction uses the `dist_k*` scalars instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum DistortionProfile {
    Poly3 { k1: f32 },
    Poly5 { k1: f32, k2: f32 },
    Ptlens { a: f32, b: f32, c: f32 },
}

/// Every knob of one render request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessParams {
    // Demosaic
    pub demosaic: DemosaicAlgorithm,

    // Exposure & white balance
    /// Exposure compensation in stops, [-4, 4].
    pub exposure: f32,
    /// Color temperature in Kelvin, [1500, 15000].
    pub color_temp: f32,
    /// Green/magenta tint, [-1, 1].
    pub tint: f32,
    /// Gr/Gb response balance, [0.5, 2].
    pub green_balance: f32,

    // Chromatic aberration
    /// Automatic CA correction strength, [0, 2].
    pub ca_strength: f32,
    /// Manual red/cyan lateral CA, [-100, 100].
    pub ca_red_cyan: f32,
    /// Manual blue/yellow lateral CA, [-100, 100].
    pub ca_blue_yellow: f32,

    // Denoise
    /// Denoise kernel selection.
    pub denoise_method: DenoiseMethod,
    /// Denoise blend, [0, 100].
    pub denoise_strength: f32,
    /// Guided-filter smoothness, positive; typical range [1e-4, 1e-1].
    pub denoise_eps: f32,

    // Dehaze
    /// Dehaze strength, [0, 100].
    pub dehaze_strength: f32,

    // Local Laplacian
    /// Fine detail, [-100, 100].
    pub ll_detail: f32,
    /// Clarity, [-100, 100].
    pub ll_clarity: f32,
    /// Shadow recovery, [-100, 100].
    pub ll_shadows: f32,
    /// Highlight recovery, [-100, 100].
    pub ll_highlights: f32,
    /// Black point, [-100, 100].
    pub ll_blacks: f32,
    /// White point, [-100, 100].
    pub ll_whites: f32,

    // Tone curve
    /// Display gamma for the base tonemap, [1, 3].
    pub gamma: f32,
    /// Default S-curve strength when no curve is set, [0, 100].
    pub contrast: f32,
    /// Curve source selection.
    pub curve_mode: CurveMode,
    /// Master luma curve points.
    pub curve_luma: Vec<CurvePoint>,
    /// Red channel curve points.
    pub curve_r: Vec<CurvePoint>,
    /// Green channel curve points.
    pub curve_g: Vec<CurvePoint>,
    /// Blue channel curve points.
    pub curve_b: Vec<CurvePoint>,
    /// Apply the display-gamma pre-transform before the curve (the
    /// pipeline LUT). Disable for linear preview tables.
    pub base_tonemap: bool,

    // Color grading
    pub shadows_wheel: WheelParams,
    pub midtones_wheel: WheelParams,
    pub highlights_wheel: WheelParams,
    pub hue_vs_hue: Vec<CurvePoint>,
    pub hue_vs_sat: Vec<CurvePoint>,
    pub hue_vs_lum: Vec<CurvePoint>,
    pub lum_vs_sat: Vec<CurvePoint>,
    pub sat_vs_sat: Vec<CurvePoint>,

    // Saturation
    /// Global saturation, [0, 3]; 1 is neutral.
    pub saturation: f32,

    // Vignette
    /// Vignette amount, [-100, 100].
    pub vignette_amount: f32,
    /// Vignette midpoint, [0, 100].
    pub vignette_midpoint: f32,
    /// Vignette roundness, [0, 100].
    pub vignette_roundness: f32,
    /// Vignette highlight protection, [0, 100].
    pub vignette_highlights: f32,

    // Lens distortion
    /// Manual distortion terms (POLY5 k1).
    pub dist_k1: f32,
    /// Manual distortion terms (POLY5 k2).
    pub dist_k2: f32,
    /// Manual distortion terms (third PTLENS term when a profile asks
    /// for it; unused by the manual POLY5 path).
    pub dist_k3: f32,
    /// Resolved lens profile; overrides the manual terms.
    pub distortion_profile: Option<DistortionProfile>,

    // Geometry
    /// Rotation in degrees, [-180, 180].
    pub rotate: f32,
    /// Scale in percent, [10, 400].
    pub scale: f32,
    /// Aspect multiplier, [0.5, 2].
    pub aspect: f32,
    /// Vertical keystone, [-100, 100].
    pub keystone_v: f32,
    /// Horizontal keystone, [-100, 100].
    pub keystone_h: f32,
    /// Horizontal offset in pixels.
    pub offset_x: f32,
    /// Vertical offset in pixels.
    pub offset_y: f32,

    // Output
    /// Output downscale factor, [1, 8]; 1 renders full resolution.
    pub downscale: f32,

    // Raw cleanup
    /// Clamp isolated hot photosites before demosaicing.
    pub hot_pixel_suppression: bool,
}

impl Default for ProcessParams {
    fn default() -> Self {
        Self {
            demosaic: DemosaicAlgorithm::Fast,
            exposure: 0.0,
            color_temp: 3700.0,
            tint: 0.0,
            green_balance: 1.0,
            ca_strength: 0.0,
            ca_red_cyan: 0.0,
            ca_blue_yellow: 0.0,
            denoise_method: DenoiseMethod::Guided,
            denoise_strength: 0.0,
            denoise_eps: 0.01,
            dehaze_strength: 0.0,
            ll_detail: 0.0,
            ll_clarity: 0.0,
            ll_shadows: 0.0,
            ll_highlights: 0.0,
            ll_blacks: 0.0,
            ll_whites: 0.0,
            gamma: 2.2,
            contrast: 50.0,
            curve_mode: CurveMode::Rgb,
            curve_luma: Vec::new(),
            curve_r: Vec::new(),
            curve_g: Vec::new(),
            curve_b: Vec::new(),
            base_tonemap: true,
            shadows_wheel: WheelParams::default(),
            midtones_wheel: WheelParams::default(),
            highlights_wheel: WheelParams::default(),
            hue_vs_hue: Vec::new(),
            hue_vs_sat: Vec::new(),
            hue_vs_lum: Vec::new(),
            lum_vs_sat: Vec::new(),
            sat_vs_sat: Vec::new(),
            saturation: 1.0,
            vignette_amount: 0.0,
            vignette_midpoint: 50.0,
            vignette_roundness: 100.0,
            vignette_highlights: 0.0,
            dist_k1: 0.0,
            dist_k2: 0.0,
            dist_k3: 0.0,
            distortion_profile: None,
            rotate: 0.0,
            scale: 100.0,
            aspect: 1.0,
            keystone_v: 0.0,
            keystone_h: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            downscale: 1.0,
            hot_pixel_suppression: true,
        }
    }
}

impl ProcessParams {
    /// Validates the record: clamps scalars, rejects broken curves.
    ///
    /// Returns the clamped copy plus one warning per clamped field.
    pub fn validated(&self) -> PipelineResult<(Self, Vec<String>)> {
        let mut p = self.clone();
        let mut warnings = Vec::new();

        for (name, points) in [
            ("curve-luma", &p.curve_luma),
            ("curve-r", &p.curve_r),
            ("curve-g", &p.curve_g),
            ("curve-b", &p.curve_b),
            ("hue-vs-hue", &p.hue_vs_hue),
            ("hue-vs-sat", &p.hue_vs_sat),
            ("hue-vs-lum", &p.hue_vs_lum),
            ("lum-vs-sat", &p.lum_vs_sat),
            ("sat-vs-sat", &p.sat_vs_sat),
        ] {
            if !is_x_monotone(points) {
                return Err(PipelineError::InvalidParam(format!(
                    "{name}: curve x coordinates must be non-decreasing"
                )));
            }
        }

        let mut clamp = |name: &str, value: &mut f32, lo: f32, hi: f32| {
            if *value < lo || *value > hi {
                let clamped = value.clamp(lo, hi);
                warnings.push(format!("{name} {value} clamped to {clamped}"));
                *value = clamped;
            }
        };

        clamp("exposure", &mut p.exposure, -4.0, 4.0);
        clamp("color-temp", &mut p.color_temp, 1500.0, 15000.0);
        clamp("tint", &mut p.tint, -1.0, 1.0);
        clamp("green-balance", &mut p.green_balance, 0.5, 2.0);
        clamp("ca-strength", &mut p.ca_strength, 0.0, 2.0);
        clamp("ca-red-cyan", &mut p.ca_red_cyan, -100.0, 100.0);
        clamp("ca-blue-yellow", &mut p.ca_blue_yellow, -100.0, 100.0);
        clamp("denoise-strength", &mut p.denoise_strength, 0.0, 100.0);
        clamp("denoise-eps", &mut p.denoise_eps, 1e-6, 1.0);
        clamp("dehaze", &mut p.dehaze_strength, 0.0, 100.0);
        clamp("ll-detail", &mut p.ll_detail, -100.0, 100.0);
        clamp("ll-clarity", &mut p.ll_clarity, -100.0, 100.0);
        clamp("ll-shadows", &mut p.ll_shadows, -100.0, 100.0);
        clamp("ll-highlights", &mut p.ll_highlights, -100.0, 100.0);
        clamp("ll-blacks", &mut p.ll_blacks, -100.0, 100.0);
        clamp("ll-whites", &mut p.ll_whites, -100.0, 100.0);
        clamp("gamma", &mut p.gamma, 1.0, 3.0);
        clamp("contrast", &mut p.contrast, 0.0, 100.0);
        clamp("saturation", &mut p.saturation, 0.0, 3.0);
        clamp("vignette-amount", &mut p.vignette_amount, -100.0, 100.0);
        clamp("vignette-midpoint", &mut p.vignette_midpoint, 0.0, 100.0);
        clamp("vignette-roundness", &mut p.vignette_roundness, 0.0, 100.0);
        clamp("vignette-highlights", &mut p.vignette_highlights, 0.0, 100.0);
        clamp("rotate", &mut p.rotate, -180.0, 180.0);
        clamp("scale", &mut p.scale, 10.0, 400.0);
        clamp("aspect", &mut p.aspect, 0.5, 2.0);
        clamp("keystone-v", &mut p.keystone_v, -100.0, 100.0);
        clamp("keystone-h", &mut p.keystone_h, -100.0, 100.0);
        clamp("downscale", &mut p.downscale, 1.0, 8.0);

        for wheel in [
            &mut p.shadows_wheel,
            &mut p.midtones_wheel,
            &mut p.highlights_wheel,
        ] {
            let clamped = WheelParams {
                x: wheel.x.clamp(-1.0, 1.0),
                y: wheel.y.clamp(-1.0, 1.0),
                luma: wheel.luma.clamp(-100.0, 100.0),
            };
            if clamped != *wheel {
                warnings.push("color wheel clamped to its range".into());
                *wheel = clamped;
            }
        }

        Ok((p, warnings))
    }

    /// Resolves the effective distortion model.
    ///
    /// A resolved profile wins; otherwise non-zero manual terms select
    /// POLY5, and all-zero terms mean no correction.
    pub fn distortion_model(&self) -> DistortionModel {
        if let Some(profile) = self.distortion_profile {
            return match profile {
                DistortionProfile::Poly3 { k1 } => DistortionModel::Poly3 { k1 },
                DistortionProfile::Poly5 { k1, k2 } => DistortionModel::Poly5 { k1, k2 },
                DistortionProfile::Ptlens { a, b, c } => DistortionModel::Ptlens { a, b, c },
            };
        }
        let e = 1e-6;
        if self.dist_k1.abs() > e || self.dist_k2.abs() > e || self.dist_k3.abs() > e {
            DistortionModel::Poly5 {
                k1: self.dist_k1,
                k2: self.dist_k2,
            }
        } else {
            DistortionModel::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate_clean() {
        let (p, warnings) = ProcessParams::default().validated().unwrap();
        assert!(warnings.is_empty());
        assert_eq!(p.color_temp, 3700.0);
        assert_eq!(p.saturation, 1.0);
    }

    #[test]
    fn test_out_of_range_clamps_with_warning() {
        let params = ProcessParams {
            exposure: 9.0,
            dehaze_strength: -5.0,
            ..Default::default()
        };
        let (p, warnings) = params.validated().unwrap();
        assert_eq!(p.exposure, 4.0);
        assert_eq!(p.dehaze_strength, 0.0);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_non_monotone_curve_rejected() {
        let params = ProcessParams {
            curve_luma: vec![CurvePoint::new(0.7, 0.1), CurvePoint::new(0.2, 0.9)],
            ..Default::default()
        };
        let err = params.validated().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParam(_)));
    }

    #[test]
    fn test_distortion_resolution() {
        let mut params = ProcessParams::default();
        assert_eq!(params.distortion_model(), DistortionModel::None);

        params.dist_k1 = 0.05;
        assert_eq!(
            params.distortion_model(),
            DistortionModel::Poly5 { k1: 0.05, k2: 0.0 }
        );

        params.distortion_profile = Some(DistortionProfile::Poly3 { k1: 0.1 });
        assert_eq!(
            params.distortion_model(),
            DistortionModel::Poly3 { k1: 0.1 }
        );
    }

    #[test]
    fn test_wheel_clamping() {
        let params = ProcessParams {
            shadows_wheel: WheelParams {
                x: 2.0,
                y: -3.0,
                luma: 150.0,
            },
            ..Default::default()
        };
        let (p, warnings) = params.validated().unwrap();
        assert_eq!(p.shadows_wheel.x, 1.0);
        assert_eq!(p.shadows_wheel.y, -1.0);
        assert_eq!(p.shadows_wheel.luma, 100.0);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_serde_roundtrip() {
        let params = ProcessParams {
            exposure: 1.5,
            curve_luma: vec![CurvePoint::new(0.25, 0.2)],
            distortion_profile: Some(DistortionProfile::Poly5 { k1: 0.1, k2: 0.01 }),
            ..Default::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        let back: ProcessParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back.exposure, 1.5);
        assert_eq!(back.curve_luma.len(), 1);
        assert_eq!(back.distortion_profile, params.distortion_profile);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let back: ProcessParams = serde_json::from_str(r#"{"exposure": -2.0}"#).unwrap();
        assert_eq!(back.exposure, -2.0);
        assert_eq!(back.contrast, 50.0);
        assert!(back.hot_pixel_suppression);
    }
}
