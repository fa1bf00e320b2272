//! The render driver: fixed kernel order, one synchronous pass.
//!
//! ```text
//! CFA normalize -> hot pixel -> denoise(raw) -> CA correct(raw)
//!  -> demosaic -> normalize levels -> color correct -> exposure
//!  -> local Laplacian -> vignette -> color grade -> saturation
//!  -> dehaze -> lens resample -> tone curve -> u8
//! ```
//!
//! The per-request ancillaries (interpolated color matrix, tone-curve LUT,
//! grading LUT, inverse-distortion LUT) are built once up front. The input
//! mosaic is borrowed for the duration of the call; intermediates are owned
//! here and released at the end; the output buffer is written exactly once.

use rawdev_color::{interpolate_matrix, normalize_offsets};
use rawdev_core::{Rgb8Buffer, Rgb8Layout, RgbImage};
use rawdev_io::RawImage;
use rawdev_lut::{DistortionLut, GradingLut, GradingParams, ToneCurveLut, ToneCurves, Wheel};
use rawdev_ops as ops;
use rawdev_ops::{LaplacianSettings, LensGeometry, VignetteSettings};

use crate::params::{CurveMode, DenoiseMethod, ProcessParams, WheelParams};
use crate::profile::Profiler;
use crate::{PipelineError, PipelineResult};

/// The finished render plus any validation warnings.
#[derive(Debug)]
pub struct RenderOutput {
    /// 8-bit RGB result in the caller's requested layout.
    pub image: Rgb8Buffer,
    /// One entry per clamped parameter.
    pub warnings: Vec<String>,
}

/// Renders one request synchronously.
///
/// # Errors
///
/// [`PipelineError::InvalidParam`] for unrecoverable parameter problems,
/// [`PipelineError::InvalidInput`] for unusable mosaics or metadata.
pub fn run(
    params: &ProcessParams,
    raw: &RawImage,
    layout: Rgb8Layout,
) -> PipelineResult<RenderOutput> {
    let (p, warnings) = params.validated()?;

    let (w, h) = raw.dimensions();
    if w == 0 || h == 0 || w % 2 != 0 || h % 2 != 0 {
        return Err(PipelineError::InvalidInput(format!(
            "mosaic dimensions must be even and non-zero, got {w}x{h}"
        )));
    }
    if raw.black >= raw.white {
        return Err(PipelineError::InvalidInput(format!(
            "black level {} must be below white level {}",
            raw.black, raw.white
        )));
    }

    let profiler = Profiler::new();

    // Per-request ancillaries.
    let (matrix, tone_lut, grading_lut, distortion_lut) = {
        let _t = profiler.scope("host-luts");
        let m_3200 = normalize_offsets(&raw.matrix_3200, raw.black, raw.white);
        let m_7000 = normalize_offsets(&raw.matrix_7000, raw.black, raw.white);
        let matrix = interpolate_matrix(&m_3200, &m_7000, p.color_temp);

        // The image is level-normalized before tone mapping, so the LUT
        // domain is the full encoded range.
        let curves = match p.curve_mode {
            CurveMode::Luma => ToneCurves {
                luma: &p.curve_luma,
                ..Default::default()
            },
            CurveMode::Rgb => ToneCurves {
                luma: &p.curve_luma,
                r: &p.curve_r,
                g: &p.curve_g,
                b: &p.curve_b,
            },
        };
        let tone_lut =
            ToneCurveLut::build(&curves, p.contrast, p.gamma, p.base_tonemap, 0, 65535);

        let wheel = |w: &WheelParams| Wheel {
            x: w.x,
            y: w.y,
            luma: w.luma,
        };
        let grading_lut = GradingLut::build(&GradingParams {
            hue_vs_hue: &p.hue_vs_hue,
            hue_vs_sat: &p.hue_vs_sat,
            hue_vs_lum: &p.hue_vs_lum,
            lum_vs_sat: &p.lum_vs_sat,
            sat_vs_sat: &p.sat_vs_sat,
            shadows: wheel(&p.shadows_wheel),
            midtones: wheel(&p.midtones_wheel),
            highlights: wheel(&p.highlights_wheel),
        });

        let distortion_lut = DistortionLut::build(p.distortion_model());
        (matrix, tone_lut, grading_lut, distortion_lut)
    };

    // Raw-domain chain.
    let bayer = {
        let _t = profiler.scope("cfa-normalize");
        ops::cfa_normalize(&raw.bayer, raw.pattern, p.green_balance)
    };
    let bayer = if p.hot_pixel_suppression {
        let _t = profiler.scope("hot-pixel");
        ops::hot_pixel_suppress(&bayer)
    } else {
        bayer
    };
    let bayer = {
        let _t = profiler.scope("denoise");
        let strength = (p.denoise_strength / 100.0).clamp(0.0, 1.0);
        match p.denoise_method {
            DenoiseMethod::Guided => {
                ops::denoise(&bayer, raw.black, raw.white, strength, p.denoise_eps)
            }
            DenoiseMethod::Nlmeans => {
                ops::denoise_nlmeans(&bayer, raw.black, raw.white, strength)
            }
        }
    };
    let bayer = {
        let _t = profiler.scope("ca-correct");
        ops::ca_correct(&bayer, raw.black, raw.white, p.ca_strength)
    };

    // RGB chain.
    let mut img = {
        let _t = profiler.scope("demosaic");
        ops::demosaic(&bayer, p.demosaic)?
    };
    {
        let _t = profiler.scope("color-correct");
        ops::normalize_levels(&mut img, raw.black, raw.white);
        ops::color_correct(&mut img, &matrix, p.tint);
    }
    {
        let _t = profiler.scope("exposure");
        ops::exposure(&mut img, p.exposure);
    }
    let mut img = {
        let _t = profiler.scope("local-laplacian");
        ops::local_laplacian(
            &img,
            &LaplacianSettings {
                detail: p.ll_detail,
                clarity: p.ll_clarity,
                shadows: p.ll_shadows,
                highlights: p.ll_highlights,
                blacks: p.ll_blacks,
                whites: p.ll_whites,
            },
        )
    };
    {
        let _t = profiler.scope("vignette");
        ops::vignette(
            &mut img,
            &VignetteSettings {
                amount: p.vignette_amount,
                midpoint: p.vignette_midpoint,
                roundness: p.vignette_roundness,
                highlights: p.vignette_highlights,
            },
        );
    }
    {
        let _t = profiler.scope("color-grade");
        ops::color_grade(&mut img, &grading_lut);
    }
    {
        let _t = profiler.scope("saturation");
        ops::saturation(&mut img, p.saturation);
    }
    {
        let _t = profiler.scope("dehaze");
        ops::dehaze(&mut img, p.dehaze_strength);
    }
    let img = {
        let _t = profiler.scope("lens-resample");
        ops::lens_resample(
            &img,
            &LensGeometry {
                rotate: p.rotate,
                scale: p.scale,
                aspect: p.aspect,
                keystone_v: p.keystone_v,
                keystone_h: p.keystone_h,
                offset_x: p.offset_x,
                offset_y: p.offset_y,
                ca_red_cyan: p.ca_red_cyan,
                ca_blue_yellow: p.ca_blue_yellow,
            },
            &distortion_lut,
        )
    };

    // Optional downscaled output.
    let (out_w, out_h) = if p.downscale > 1.001 {
        (
            ((w as f32 / p.downscale) as u32).max(1),
            ((h as f32 / p.downscale) as u32).max(1),
        )
    } else {
        (w, h)
    };
    let img = if (out_w, out_h) != (w, h) {
        let _t = profiler.scope("resize");
        ops::resize_bicubic(&img, out_w, out_h)
    } else {
        img
    };

    check_finite(&img)?;

    let mut out = Rgb8Buffer::new(out_w, out_h, layout);
    {
        let _t = profiler.scope("tone-curve");
        ops::tone_map(&img, &tone_lut, &mut out);
    }

    for (stage, ms) in profiler.records() {
        tracing::trace!(stage, elapsed_ms = ms, "stage timing");
    }

    Ok(RenderOutput {
        image: out,
        warnings,
    })
}

/// Debug-build guard against numeric blow-up inside the kernels.
#[cfg(debug_assertions)]
fn check_finite(img: &RgbImage) -> PipelineResult<()> {
    for c in 0..3 {
        if img.channel(c).data().iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::Internal(format!(
                "non-finite value in channel {c}"
            )));
        }
    }
    Ok(())
}

#[cfg(not(debug_assertions))]
fn check_finite(_img: &RgbImage) -> PipelineResult<()> {
    Ok(())
}
