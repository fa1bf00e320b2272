//! Local-contrast adjustment over a Laplacian pyramid.
//!
//! Works on normalized lightness (`L*/100`) with the a*/b* chroma planes
//! preserved. An 8-level Gaussian pyramid is built for each of 8 "reference
//! level" remappings of the input lightness; per output pixel the stage
//! picks the Laplacian coefficient by interpolating between the two
//! remappings bracketing the local lightness, then collapses the pyramid.
//!
//! The per-level remap combines clarity (slope around the reference),
//! shadows/highlights (offsets masked by smooth-steps over the reference),
//! and a detail boost curve `t * exp(-t^2 / 2)` scaled by the sharpen
//! slider. Blacks/whites remap the reconstructed RGB at the end.
//!
//! Levels below the cutover carry full-resolution planes and compute their
//! per-reference remaps in parallel; the coarse levels above it are small
//! enough to run sequentially.

use rawdev_color::{lab_to_xyz, linear_srgb_to_xyz, xyz_to_lab, xyz_to_linear_srgb};
use rawdev_core::{Plane, RgbImage};
use rawdev_math::{lerp, smoothstep};
use rayon::prelude::*;

/// Pyramid depth.
const LEVELS: usize = 8;

/// Level index separating the parallel fine levels from the serial coarse
/// ones.
const CUTOVER: usize = 4;

/// Local Laplacian sliders, each in [-100, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LaplacianSettings {
    /// Fine detail boost (sharpen).
    pub detail: f32,
    /// Mid-scale contrast around the local reference.
    pub clarity: f32,
    /// Shadow recovery.
    pub shadows: f32,
    /// Highlight recovery.
    pub highlights: f32,
    /// Black point adjustment.
    pub blacks: f32,
    /// White point adjustment.
    pub whites: f32,
}

impl LaplacianSettings {
    /// Returns `true` when every slider is neutral.
    pub fn is_neutral(&self) -> bool {
        self.detail == 0.0
            && self.clarity == 0.0
            && self.shadows == 0.0
            && self.highlights == 0.0
            && self.blacks == 0.0
            && self.whites == 0.0
    }
}

/// Applies the local Laplacian adjustment.
///
/// Returns the input unchanged when all sliders are neutral.
pub fn local_laplacian(img: &RgbImage, settings: &LaplacianSettings) -> RgbImage {
    if settings.is_neutral() {
        return img.clone();
    }

    let (w, h) = img.dimensions();

    // Split into normalized lightness plus preserved chroma planes.
    let mut l_norm = Plane::new(w, h);
    let mut a_chan = Plane::new(w, h);
    let mut b_chan = Plane::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let lab = xyz_to_lab(linear_srgb_to_xyz(img.pixel(x, y)));
            l_norm.set(x, y, lab[0] / 100.0);
            a_chan.set(x, y, lab[1]);
            b_chan.set(x, y, lab[2]);
        }
    }

    // Detail boost curve, quantized to 256 entries like the lightness it
    // indexes.
    let mut detail_lut = [0.0f32; 256];
    for (i, slot) in detail_lut.iter_mut().enumerate() {
        let t = i as f32 / 256.0;
        *slot = (settings.detail / 100.0) * t * (-t * t / 2.0).exp();
    }

    let remap = |l: f32, k: usize| -> f32 {
        let kf = k as f32 / (LEVELS - 1) as f32;
        let base = (1.0 + settings.clarity / 100.0) * (l - kf) + kf;
        let shadow_lift = settings.shadows / 100.0 * (1.0 - smoothstep(0.0, 0.5, kf));
        let highlight_lift = settings.highlights / 100.0 * smoothstep(0.5, 1.0, kf);
        let detail = detail_lut[(l * 256.0).clamp(0.0, 255.0) as usize];
        base + shadow_lift + highlight_lift + detail
    };

    // Gaussian pyramids: one per reference level for the remapped input,
    // one for the raw lightness that steers coefficient selection.
    let mut g_pyr: Vec<Vec<Plane<f32>>> = Vec::with_capacity(LEVELS);
    let level0: Vec<Plane<f32>> = (0..LEVELS)
        .into_par_iter()
        .map(|k| {
            let mut p = Plane::new(w, h);
            p.data_mut()
                .iter_mut()
                .zip(l_norm.data().iter())
                .for_each(|(dst, &l)| *dst = remap(l, k));
            p
        })
        .collect();
    g_pyr.push(level0);
    for j in 1..LEVELS {
        let prev = &g_pyr[j - 1];
        let next: Vec<Plane<f32>> = if j < CUTOVER {
            prev.par_iter().map(downsample).collect()
        } else {
            prev.iter().map(downsample).collect()
        };
        g_pyr.push(next);
    }

    let mut in_g: Vec<Plane<f32>> = Vec::with_capacity(LEVELS);
    in_g.push(l_norm);
    for j in 1..LEVELS {
        in_g.push(downsample(&in_g[j - 1]));
    }

    // Laplacian coefficients per level and reference.
    let mut lap: Vec<Vec<Plane<f32>>> = Vec::with_capacity(LEVELS);
    for j in 0..LEVELS {
        if j == LEVELS - 1 {
            lap.push(g_pyr[j].clone());
            continue;
        }
        let (lw, lh) = g_pyr[j][0].dimensions();
        let build = |k: &Plane<f32>, coarse: &Plane<f32>| -> Plane<f32> {
            let up = upsample(coarse, lw, lh);
            let mut p = k.clone();
            p.data_mut()
                .iter_mut()
                .zip(up.data().iter())
                .for_each(|(dst, &u)| *dst -= u);
            p
        };
        let level: Vec<Plane<f32>> = if j < CUTOVER {
            g_pyr[j]
                .par_iter()
                .zip(g_pyr[j + 1].par_iter())
                .map(|(k, coarse)| build(k, coarse))
                .collect()
        } else {
            g_pyr[j]
                .iter()
                .zip(g_pyr[j + 1].iter())
                .map(|(k, coarse)| build(k, coarse))
                .collect()
        };
        lap.push(level);
    }

    // Select coefficients by local lightness, then collapse fine-to-coarse.
    let mut out_g: Option<Plane<f32>> = None;
    for j in (0..LEVELS).rev() {
        let selected = select_level(&lap[j], &in_g[j]);
        let merged = match out_g.take() {
            None => selected,
            Some(coarse) => {
                let (lw, lh) = selected.dimensions();
                let mut up = upsample(&coarse, lw, lh);
                up.data_mut()
                    .iter_mut()
                    .zip(selected.data().iter())
                    .for_each(|(dst, &v)| *dst += v);
                up
            }
        };
        out_g = Some(merged);
    }
    let l_out = out_g.unwrap_or_else(|| Plane::new(w, h));

    // Back to RGB with preserved chroma, then the blacks/whites remap.
    let blacks_level = settings.blacks / 250.0;
    let whites_level = 1.0 + settings.whites / 250.0;
    let mut denom = whites_level - blacks_level;
    if denom.abs() < 1e-5 {
        denom = 1e-5;
    }

    let mut out = RgbImage::new(w, h);
    let wq = w as usize;
    let [ro, go, bo] = out.channels_mut();
    ro.data_mut()
        .par_chunks_mut(wq)
        .zip(go.data_mut().par_chunks_mut(wq))
        .zip(bo.data_mut().par_chunks_mut(wq))
        .enumerate()
        .for_each(|(y, ((r_row, g_row), b_row))| {
            let y = y as u32;
            for x in 0..wq {
                let l = l_out.get(x as u32, y) * 100.0;
                let lab = [l, a_chan.get(x as u32, y), b_chan.get(x as u32, y)];
                let rgb = xyz_to_linear_srgb(lab_to_xyz(lab));
                r_row[x] = ((rgb[0] - blacks_level) / denom).clamp(0.0, 1.0);
                g_row[x] = ((rgb[1] - blacks_level) / denom).clamp(0.0, 1.0);
                b_row[x] = ((rgb[2] - blacks_level) / denom).clamp(0.0, 1.0);
            }
        });

    out
}

/// Per-pixel interpolation between the two reference planes bracketing the
/// local lightness.
fn select_level(planes: &[Plane<f32>], steer: &Plane<f32>) -> Plane<f32> {
    let (w, h) = planes[0].dimensions();
    let mut out = Plane::new(w, h);
    out.data_mut()
        .par_chunks_mut(w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            for (x, slot) in row.iter_mut().enumerate() {
                let level_val = steer.get(x as u32, y) * (LEVELS - 1) as f32;
                let li = (level_val.floor() as i32).clamp(0, LEVELS as i32 - 2) as usize;
                let frac = level_val - li as f32;
                *slot = lerp(
                    planes[li].get(x as u32, y),
                    planes[li + 1].get(x as u32, y),
                    frac,
                );
            }
        });
    out
}

/// Halves a plane with the separable [1 3 3 1]/8 filter, edge-repeat.
fn downsample(p: &Plane<f32>) -> Plane<f32> {
    let (w, h) = p.dimensions();
    let hw = w.div_ceil(2).max(1);
    let hh = h.div_ceil(2).max(1);

    let mut horiz = Plane::new(hw, h);
    for y in 0..h as i64 {
        for x in 0..hw as i64 {
            let v = (p.at_repeat(2 * x - 1, y)
                + 3.0 * p.at_repeat(2 * x, y)
                + 3.0 * p.at_repeat(2 * x + 1, y)
                + p.at_repeat(2 * x + 2, y))
                / 8.0;
            horiz.set(x as u32, y as u32, v);
        }
    }

    let mut out = Plane::new(hw, hh);
    for y in 0..hh as i64 {
        for x in 0..hw as i64 {
            let v = (horiz.at_repeat(x, 2 * y - 1)
                + 3.0 * horiz.at_repeat(x, 2 * y)
                + 3.0 * horiz.at_repeat(x, 2 * y + 1)
                + horiz.at_repeat(x, 2 * y + 2))
                / 8.0;
            out.set(x as u32, y as u32, v);
        }
    }
    out
}

/// Doubles a plane to the requested size with the [0.25, 0.75] filter.
fn upsample(p: &Plane<f32>, tw: u32, th: u32) -> Plane<f32> {
    let (_, sh) = p.dimensions();

    let mut horiz = Plane::new(tw, sh);
    for y in 0..sh as i64 {
        for x in 0..tw as i64 {
            let near = x / 2;
            let far = near - 1 + 2 * (x % 2);
            horiz.set(
                x as u32,
                y as u32,
                0.25 * p.at_repeat(far, y) + 0.75 * p.at_repeat(near, y),
            );
        }
    }

    let mut out = Plane::new(tw, th);
    for y in 0..th as i64 {
        for x in 0..tw as i64 {
            let near = y / 2;
            let far = near - 1 + 2 * (y % 2);
            out.set(
                x as u32,
                y as u32,
                0.25 * horiz.at_repeat(x, far) + 0.75 * horiz.at_repeat(x, near),
            );
        }
    }
    out
}
