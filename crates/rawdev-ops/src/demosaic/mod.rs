//! Demosaicing: full RGB reconstruction from the GRBG Bayer plane.
//!
//! All four algorithms consume a deinterleaved view of the mosaic: four
//! half-resolution float planes ordered Gr, R, B, Gb (the four slots of the
//! GRBG quad). Reconstruction runs in floating point in the sensor value
//! domain and clamps results to [0, 65535].
//!
//! Algorithms, by selection tag:
//!
//! | tag | algorithm | character |
//! |-----|-----------|-----------|
//! | 0 | [`ahd`] | gradient green, 4-neighbor color differences |
//! | 1 | [`lmmse`] | gradient green, Gr-anchored color differences |
//! | 2 | [`ri`] | residual interpolation, sharpest |
//! | 3 | [`fast`] | directional color differences, default |
//!
//! Unknown tags fall back to fast with a warning.

mod ahd;
mod fast;
mod lmmse;
mod ri;

use rawdev_core::{Plane, RgbImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{OpsError, OpsResult};

/// Demosaicing algorithm selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemosaicAlgorithm {
    /// Adaptive homogeneity-directed variant.
    Ahd,
    /// LMMSE-style color-difference variant.
    Lmmse,
    /// Residual interpolation.
    Ri,
    /// Directional color-difference interpolation (fastest).
    #[default]
    Fast,
}

impl DemosaicAlgorithm {
    /// Parses the integer tag (0 = AHD, 1 = LMMSE, 2 = RI, 3 = fast).
    ///
    /// Unknown tags select fast.
    pub fn from_tag(tag: i32) -> Self {
        match tag {
            0 => DemosaicAlgorithm::Ahd,
            1 => DemosaicAlgorithm::Lmmse,
            2 => DemosaicAlgorithm::Ri,
            3 => DemosaicAlgorithm::Fast,
            other => {
                tracing::warn!(tag = other, "unknown demosaic tag, defaulting to fast");
                DemosaicAlgorithm::Fast
            }
        }
    }

    /// Parses an algorithm name. Unknown names select fast.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "ahd" => DemosaicAlgorithm::Ahd,
            "lmmse" => DemosaicAlgorithm::Lmmse,
            "ri" => DemosaicAlgorithm::Ri,
            "fast" => DemosaicAlgorithm::Fast,
            other => {
                tracing::warn!(name = other, "unknown demosaic algorithm, defaulting to fast");
                DemosaicAlgorithm::Fast
            }
        }
    }
}

/// The four half-resolution planes of a GRBG mosaic: Gr, R, B, Gb.
pub struct Deinterleaved {
    /// Green samples on red rows.
    pub gr: Plane<f32>,
    /// Red samples.
    pub r: Plane<f32>,
    /// Blue samples.
    pub b: Plane<f32>,
    /// Green samples on blue rows.
    pub gb: Plane<f32>,
}

/// Splits a GRBG Bayer plane into four half-resolution float planes.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimensions`] for odd or zero dimensions.
pub fn deinterleave(input: &Plane<u16>) -> OpsResult<Deinterleaved> {
    let (w, h) = input.dimensions();
    if w == 0 || h == 0 || w % 2 != 0 || h % 2 != 0 {
        return Err(OpsError::InvalidDimensions(format!(
            "bayer plane must have even non-zero dimensions, got {w}x{h}"
        )));
    }
    let (hw, hh) = (w / 2, h / 2);
    let mut gr = Plane::new(hw, hh);
    let mut r = Plane::new(hw, hh);
    let mut b = Plane::new(hw, hh);
    let mut gb = Plane::new(hw, hh);

    for y in 0..hh {
        for x in 0..hw {
            gr.set(x, y, input.get(2 * x, 2 * y) as f32);
            r.set(x, y, input.get(2 * x + 1, 2 * y) as f32);
            b.set(x, y, input.get(2 * x, 2 * y + 1) as f32);
            gb.set(x, y, input.get(2 * x + 1, 2 * y + 1) as f32);
        }
    }

    Ok(Deinterleaved { gr, r, b, gb })
}

/// Demosaics a GRBG Bayer plane to full-resolution RGB.
///
/// Output values are sensor-domain floats clamped to [0, 65535].
pub fn demosaic(input: &Plane<u16>, algorithm: DemosaicAlgorithm) -> OpsResult<RgbImage> {
    let planes = deinterleave(input)?;
    let (w, h) = input.dimensions();
    Ok(match algorithm {
        DemosaicAlgorithm::Ahd => ahd::demosaic_ahd(&planes, w, h),
        DemosaicAlgorithm::Lmmse => lmmse::demosaic_lmmse(&planes, w, h),
        DemosaicAlgorithm::Ri => ri::demosaic_ri(&planes, w, h),
        DemosaicAlgorithm::Fast => fast::demosaic_fast(&planes, w, h),
    })
}

/// Gradient-directed green interpolation at R and B sites.
///
/// Shared by the fast, AHD and LMMSE variants: pick the horizontal or
/// vertical neighbor average, whichever direction has the smaller green
/// difference.
pub(crate) fn green_at_rb(d: &Deinterleaved) -> (Plane<f32>, Plane<f32>) {
    let (hw, hh) = d.gr.dimensions();
    let mut g_at_r = Plane::new(hw, hh);
    let mut g_at_b = Plane::new(hw, hh);

    for y in 0..hh as i64 {
        for x in 0..hw as i64 {
            // At the R site (right of Gr): vertical uses Gb above/here,
            // horizontal uses Gr here/right.
            let gb_up = d.gb.at_repeat(x, y - 1);
            let gb_c = d.gb.at_repeat(x, y);
            let gr_c = d.gr.at_repeat(x, y);
            let gr_right = d.gr.at_repeat(x + 1, y);

            let gv = (gb_up + gb_c) / 2.0;
            let gvd = (gb_up - gb_c).abs();
            let gh = (gr_right + gr_c) / 2.0;
            let ghd = (gr_right - gr_c).abs();
            g_at_r.set(x as u32, y as u32, if ghd < gvd { gh } else { gv });

            // At the B site (below Gr): vertical uses Gr here/below,
            // horizontal uses Gb left/here.
            let gr_down = d.gr.at_repeat(x, y + 1);
            let gb_left = d.gb.at_repeat(x - 1, y);

            let gv_b = (gr_down + gr_c) / 2.0;
            let gvd_b = (gr_down - gr_c).abs();
            let gh_b = (gb_left + gb_c) / 2.0;
            let ghd_b = (gb_left - gb_c).abs();
            g_at_b.set(x as u32, y as u32, if ghd_b < gvd_b { gh_b } else { gv_b });
        }
    }

    (g_at_r, g_at_b)
}

/// Joins three channel planes built by [`assemble`] into an image.
pub(crate) fn into_rgb(r: Plane<f32>, g: Plane<f32>, b: Plane<f32>) -> RgbImage {
    RgbImage::from_planes(r, g, b).expect("channel planes share dimensions")
}

/// Assembles full-resolution channel planes from per-slot half-res sources.
///
/// `f(slot, qx, qy)` returns the channel value for GRBG slot 0..3 at quad
/// (qx, qy); the result is clamped to the sensor range.
pub(crate) fn assemble<F>(w: u32, h: u32, f: F) -> Plane<f32>
where
    F: Fn(usize, i64, i64) -> f32 + Sync,
{
    let mut out = Plane::new(w, h);
    out.data_mut()
        .par_chunks_mut(w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let qy = (y / 2) as i64;
            let y_odd = y & 1;
            for (x, slot) in row.iter_mut().enumerate() {
                let qx = (x / 2) as i64;
                let slot_idx = (y_odd << 1) | (x & 1);
                *slot = f(slot_idx, qx, qy).clamp(0.0, 65535.0);
            }
        });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_bayer(w: u32, h: u32, v: u16) -> Plane<u16> {
        Plane::filled(w, h, v)
    }

    #[test]
    fn test_deinterleave_rejects_odd_dims() {
        let p = Plane::<u16>::new(5, 4);
        assert!(deinterleave(&p).is_err());
        let p = Plane::<u16>::new(4, 0);
        assert!(deinterleave(&p).is_err());
    }

    #[test]
    fn test_deinterleave_slots() {
        let mut p = Plane::new(2, 2);
        p.set(0, 0, 10); // Gr
        p.set(1, 0, 20); // R
        p.set(0, 1, 30); // B
        p.set(1, 1, 40); // Gb
        let d = deinterleave(&p).unwrap();
        assert_eq!(d.gr.get(0, 0), 10.0);
        assert_eq!(d.r.get(0, 0), 20.0);
        assert_eq!(d.b.get(0, 0), 30.0);
        assert_eq!(d.gb.get(0, 0), 40.0);
    }

    #[test]
    fn test_flat_input_stays_flat_all_algorithms() {
        let p = flat_bayer(16, 16, 50);
        for algo in [
            DemosaicAlgorithm::Fast,
            DemosaicAlgorithm::Ahd,
            DemosaicAlgorithm::Lmmse,
            DemosaicAlgorithm::Ri,
        ] {
            let rgb = demosaic(&p, algo).unwrap();
            for c in 0..3 {
                for y in 0..16 {
                    for x in 0..16 {
                        let v = rgb.channel(c).get(x, y);
                        assert!(
                            (48.0..=52.0).contains(&v),
                            "{algo:?} c{c} ({x},{y}) = {v}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_uniform_bounds_all_algorithms() {
        let p = flat_bayer(16, 16, 1000);
        for algo in [
            DemosaicAlgorithm::Fast,
            DemosaicAlgorithm::Ahd,
            DemosaicAlgorithm::Lmmse,
            DemosaicAlgorithm::Ri,
        ] {
            let rgb = demosaic(&p, algo).unwrap();
            for c in 0..3 {
                for v in rgb.channel(c).data() {
                    assert!(*v >= 0.0 && *v <= 1002.0, "{algo:?}: {v}");
                }
            }
        }
    }

    #[test]
    fn test_hot_pixel_spreads() {
        // A single saturated site must bleed into at least 4 neighbors
        // through interpolation.
        let mut p = Plane::filled(16, 16, 0u16);
        p.set(7, 6, 65535); // an R site in GRBG
        let rgb = demosaic(&p, DemosaicAlgorithm::Fast).unwrap();
        let mut nonzero = 0;
        for y in 0..16 {
            for x in 0..16 {
                let px = rgb.pixel(x, y);
                if px.iter().any(|&v| v > 0.0) && (x, y) != (7, 6) {
                    nonzero += 1;
                }
            }
        }
        assert!(nonzero >= 4, "only {nonzero} neighbors lit");
    }

    #[test]
    fn test_native_sites_preserved_fast() {
        // On a mosaic whose quads are constant, native samples pass through.
        let mut p = Plane::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                p.set(x, y, 4000);
            }
        }
        p.set(3, 2, 4100); // an R site (odd x, even y)
        let rgb = demosaic(&p, DemosaicAlgorithm::Fast).unwrap();
        assert_eq!(rgb.channel(0).get(3, 2), 4100.0);
    }

    #[test]
    fn test_from_tag() {
        assert_eq!(DemosaicAlgorithm::from_tag(0), DemosaicAlgorithm::Ahd);
        assert_eq!(DemosaicAlgorithm::from_tag(1), DemosaicAlgorithm::Lmmse);
        assert_eq!(DemosaicAlgorithm::from_tag(2), DemosaicAlgorithm::Ri);
        assert_eq!(DemosaicAlgorithm::from_tag(3), DemosaicAlgorithm::Fast);
        assert_eq!(DemosaicAlgorithm::from_tag(99), DemosaicAlgorithm::Fast);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(DemosaicAlgorithm::parse("ahd"), DemosaicAlgorithm::Ahd);
        assert_eq!(DemosaicAlgorithm::parse("RI"), DemosaicAlgorithm::Ri);
        assert_eq!(DemosaicAlgorithm::parse("bogus"), DemosaicAlgorithm::Fast);
    }
}
