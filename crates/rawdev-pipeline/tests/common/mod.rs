//! Shared synthetic fixtures for pipeline tests.
#![allow(dead_code)]

use rawdev_core::{CfaPattern, Plane};
use rawdev_io::RawImage;
use rawdev_math::Mat3x4;
use rawdev_pipeline::ProcessParams;

/// A mosaic whose value encodes the pixel index: `(y * w + x) * step`.
pub fn gradient_mosaic(w: u32, h: u32, step: u16) -> Plane<u16> {
    let mut p = Plane::new(w, h);
    for y in 0..h {
        for x in 0..w {
            p.set(x, y, ((y * w + x) * step as u32) as u16);
        }
    }
    p
}

/// A mosaic with constant rows: `y * step`.
pub fn row_gradient_mosaic(w: u32, h: u32, step: u16) -> Plane<u16> {
    let mut p = Plane::new(w, h);
    for y in 0..h {
        for x in 0..w {
            p.set(x, y, y as u16 * step);
        }
    }
    p
}

/// Wraps a mosaic with identity color matrices and full-range levels, so
/// the linear pipeline is a pass-through.
pub fn identity_raw(bayer: Plane<u16>) -> RawImage {
    RawImage::with_matrices(
        bayer,
        CfaPattern::Grbg,
        0,
        65535,
        Mat3x4::IDENTITY,
        Mat3x4::IDENTITY,
    )
    .expect("valid fixture")
}

/// Parameters that make every stage an identity (up to quantization):
/// linear tone curve, no base tonemap, all effect sliders neutral.
pub fn identity_params() -> ProcessParams {
    ProcessParams {
        curve_luma: vec![
            rawdev_math::CurvePoint::new(0.0, 0.0),
            rawdev_math::CurvePoint::new(1.0, 1.0),
        ],
        base_tonemap: false,
        ..Default::default()
    }
}
