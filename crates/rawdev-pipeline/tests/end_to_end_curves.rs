//! Tone-curve behavior through the whole pipeline.

mod common;

use common::{gradient_mosaic, identity_params, identity_raw, row_gradient_mosaic};
use rawdev_core::Rgb8Layout;
use rawdev_math::CurvePoint;
use rawdev_pipeline::{run, ProcessParams};

#[test]
fn test_linear_curve_matches_top_byte() {
    let raw = identity_raw(gradient_mosaic(64, 64, 16));
    let out = run(&identity_params(), &raw, Rgb8Layout::Interleaved).unwrap();
    for y in 2..62u32 {
        for x in 2..62u32 {
            let expected = (raw.bayer.get(x, y) >> 8) as i32;
            for c in 0..3 {
                let got = out.image.pixel(x, y)[c] as i32;
                assert!((got - expected).abs() <= 1, "({x},{y}) c{c}");
            }
        }
    }
}

#[test]
fn test_inverting_curve_negates() {
    let raw = identity_raw(gradient_mosaic(64, 64, 16));
    let params = ProcessParams {
        curve_luma: vec![CurvePoint::new(0.0, 1.0), CurvePoint::new(1.0, 0.0)],
        base_tonemap: false,
        ..Default::default()
    };
    let out = run(&params, &raw, Rgb8Layout::Interleaved).unwrap();
    for y in 2..62u32 {
        for x in 2..62u32 {
            let expected = ((65535 - raw.bayer.get(x, y)) >> 8) as i32;
            for c in 0..3 {
                let got = out.image.pixel(x, y)[c] as i32;
                assert!(
                    (got - expected).abs() <= 1,
                    "({x},{y}) c{c}: got {got}, expected {expected}"
                );
            }
        }
    }
}

#[test]
fn test_crushing_curve_splits_shadows_and_highlights() {
    // A curve flat at 0 until x=0.25 and flat at 1 from x=0.75 crushes the
    // darkest rows to black and blows the brightest rows to white.
    let height = 64u32;
    let raw = identity_raw(row_gradient_mosaic(64, height, 1024));
    let params = ProcessParams {
        curve_luma: vec![
            CurvePoint::new(0.0, 0.0),
            CurvePoint::new(0.25, 0.0),
            CurvePoint::new(0.75, 1.0),
            CurvePoint::new(1.0, 1.0),
        ],
        base_tonemap: false,
        ..Default::default()
    };
    let out = run(&params, &raw, Rgb8Layout::Interleaved).unwrap();

    let dark_rows = (height as f32 * 0.2) as u32;
    for y in 0..dark_rows {
        for x in 2..62u32 {
            for c in 0..3 {
                let v = out.image.pixel(x, y)[c];
                assert!(v < 2, "dark row {y} x{x} c{c}: {v}");
            }
        }
    }
    for y in height - dark_rows..height {
        for x in 2..62u32 {
            for c in 0..3 {
                let v = out.image.pixel(x, y)[c];
                assert!(v > 253, "bright row {y} x{x} c{c}: {v}");
            }
        }
    }
}

#[test]
fn test_per_channel_curve_overrides_luma() {
    // Red gets its own inverting curve; green and blue keep the luma
    // linear curve.
    let raw = identity_raw(gradient_mosaic(64, 64, 16));
    let params = ProcessParams {
        curve_luma: vec![CurvePoint::new(0.0, 0.0), CurvePoint::new(1.0, 1.0)],
        curve_r: vec![CurvePoint::new(0.0, 1.0), CurvePoint::new(1.0, 0.0)],
        base_tonemap: false,
        ..Default::default()
    };
    let out = run(&params, &raw, Rgb8Layout::Interleaved).unwrap();
    for (x, y) in [(10u32, 10u32), (40, 50)] {
        let v = raw.bayer.get(x, y);
        let px = out.image.pixel(x, y);
        let inv = ((65535 - v) >> 8) as i32;
        let lin = (v >> 8) as i32;
        assert!((px[0] as i32 - inv).abs() <= 1, "red at ({x},{y})");
        assert!((px[1] as i32 - lin).abs() <= 1, "green at ({x},{y})");
        assert!((px[2] as i32 - lin).abs() <= 1, "blue at ({x},{y})");
    }
}

#[test]
fn test_luma_mode_ignores_channel_curves() {
    let raw = identity_raw(gradient_mosaic(64, 64, 16));
    let params = ProcessParams {
        curve_luma: vec![CurvePoint::new(0.0, 0.0), CurvePoint::new(1.0, 1.0)],
        curve_r: vec![CurvePoint::new(0.0, 1.0), CurvePoint::new(1.0, 0.0)],
        curve_mode: rawdev_pipeline::CurveMode::Luma,
        base_tonemap: false,
        ..Default::default()
    };
    let out = run(&params, &raw, Rgb8Layout::Interleaved).unwrap();
    let v = raw.bayer.get(20, 20);
    let lin = (v >> 8) as i32;
    let px = out.image.pixel(20, 20);
    assert!((px[0] as i32 - lin).abs() <= 1, "red follows luma in luma mode");
}

#[test]
fn test_base_tonemap_brightens_midtones() {
    let raw = identity_raw(gradient_mosaic(64, 64, 16));
    let linear = run(&identity_params(), &raw, Rgb8Layout::Interleaved).unwrap();
    let display = run(
        &ProcessParams {
            curve_luma: vec![CurvePoint::new(0.0, 0.0), CurvePoint::new(1.0, 1.0)],
            base_tonemap: true,
            ..Default::default()
        },
        &raw,
        Rgb8Layout::Interleaved,
    )
    .unwrap();
    // Pick a midtone pixel: the gamma pre-transform lifts it.
    let (x, y) = (32u32, 32);
    assert!(display.image.pixel(x, y)[1] > linear.image.pixel(x, y)[1]);
}
