//! Raw-domain denoise: variance-stabilizing transform + guided filter.
//!
//! Sensor noise is Poisson-dominated, so plain smoothing over-blurs shadows
//! and under-smooths highlights. The Anscombe transform
//! `y = 2 * sqrt(max(0, x) + 3/8)` makes the noise approximately Gaussian;
//! the edge-preserving guided filter then runs in that space, the transform
//! is inverted, and the result blends with the original by strength.

use rawdev_core::Plane;
use rawdev_math::lerp;
use rayon::prelude::*;

/// Guided-filter radius for raw denoising.
const RAW_RADIUS: u32 = 2;

/// Denoises a Bayer plane in place of its noisy original.
///
/// `strength` in [0, 1] blends between the input (0) and the fully
/// filtered result (1). `eps` is the guided-filter smoothness; larger
/// values smooth more. Bypasses below strength 0.001.
pub fn denoise(input: &Plane<u16>, black: u16, white: u16, strength: f32, eps: f32) -> Plane<u16> {
    if strength < 0.001 {
        return input.clone();
    }

    let (w, h) = input.dimensions();
    let range = (white as f32 - black as f32).max(1.0);
    let inv_range = 1.0 / range;

    let mut norm = Plane::new(w, h);
    norm.data_mut()
        .par_iter_mut()
        .zip(input.data().par_iter())
        .for_each(|(dst, &src)| {
            *dst = (src as f32 - black as f32) * inv_range;
        });

    let mut vst = norm.clone();
    vst.map_in_place(|x| 2.0 * (x.max(0.0) + 0.375).sqrt());

    // Self-guided: the image is its own guide.
    let filtered = guided_filter(&vst, &vst, RAW_RADIUS, eps.max(1e-6), 1);

    let mut out = Plane::new(w, h);
    out.data_mut()
        .par_iter_mut()
        .zip(filtered.data().par_iter().zip(norm.data().par_iter()))
        .for_each(|(dst, (&den_vst, &orig))| {
            let inv = (den_vst / 2.0) * (den_vst / 2.0) - 0.375;
            let blended = lerp(orig, inv, strength);
            *dst = (blended * range + black as f32 + 0.5).clamp(0.0, 65535.0) as u16;
        });

    out
}

/// NL-means search window edge length.
pub const NLMEANS_SEARCH: i64 = 7;
/// NL-means patch edge length.
pub const NLMEANS_PATCH: i64 = 3;

/// Non-local-means denoise on the Bayer plane.
///
/// Alternative to the guided filter: each sample becomes a weighted mean
/// over a search window, with weights from patchwise similarity in VST
/// space. `strength` both widens the similarity kernel
/// (`h = 0.6 * strength^2`) and blends the result with the original.
/// Considerably slower than the guided path; bypasses below 0.001.
pub fn denoise_nlmeans(
    input: &Plane<u16>,
    black: u16,
    white: u16,
    strength: f32,
) -> Plane<u16> {
    if strength < 0.001 {
        return input.clone();
    }

    let (w, h) = input.dimensions();
    let range = (white as f32 - black as f32).max(1.0);
    let inv_range = 1.0 / range;

    let mut norm = Plane::new(w, h);
    norm.data_mut()
        .par_iter_mut()
        .zip(input.data().par_iter())
        .for_each(|(dst, &src)| {
            *dst = (src as f32 - black as f32) * inv_range;
        });

    let mut vst = norm.clone();
    vst.map_in_place(|x| 2.0 * (x.max(0.0) + 0.375).sqrt());

    // Filtering parameter tuned for VST data with unit sigma.
    let filter_h = 0.6 * strength * strength;
    let inv_h2 = 1.0 / (filter_h * filter_h);
    let patch_radius = NLMEANS_PATCH / 2;
    let search_radius = NLMEANS_SEARCH / 2;
    let patch_area = (NLMEANS_PATCH * NLMEANS_PATCH) as f32;

    let mut out = Plane::new(w, h);
    out.data_mut()
        .par_chunks_mut(w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i64;
            for (x, slot) in row.iter_mut().enumerate() {
                let x = x as i64;
                let mut total_weight = 0.0f32;
                let mut weighted_sum = 0.0f32;
                for sy in -search_radius..=search_radius {
                    for sx in -search_radius..=search_radius {
                        let mut ssd = 0.0f32;
                        for py in -patch_radius..=patch_radius {
                            for px in -patch_radius..=patch_radius {
                                let d = vst.at_repeat(x + px, y + py)
                                    - vst.at_repeat(x + sx + px, y + sy + py);
                                ssd += d * d;
                            }
                        }
                        let weight = (-ssd * inv_h2 / patch_area).exp();
                        total_weight += weight;
                        weighted_sum += weight * vst.at_repeat(x + sx, y + sy);
                    }
                }
                // The center patch always contributes weight 1.
                let filtered = weighted_sum / total_weight;
                let inv = (filtered / 2.0) * (filtered / 2.0) - 0.375;
                let blended = lerp(norm.get(x as u32, y as u32), inv, strength);
                *slot = (blended * range + black as f32 + 0.5).clamp(0.0, 65535.0) as u16;
            }
        });

    out
}

/// Edge-preserving guided filter on a single-channel plane.
///
/// Computes box-filtered moments of guide and image, fits the local linear
/// model `a * guide + b` with smoothness `eps`, and evaluates it at full
/// resolution. `subsample` > 1 computes the model on a strided grid and
/// upsamples the coefficients (used for coarse tonal bases; raw denoising
/// passes 1).
pub fn guided_filter(
    image: &Plane<f32>,
    guide: &Plane<f32>,
    radius: u32,
    eps: f32,
    subsample: u32,
) -> Plane<f32> {
    let (w, h) = image.dimensions();
    let s = subsample.max(1);

    let (small_image, small_guide) = if s > 1 {
        (stride_sample(image, s), stride_sample(guide, s))
    } else {
        (image.clone(), guide.clone())
    };

    let mean_i = box_mean(&small_guide, radius);
    let mean_p = box_mean(&small_image, radius);

    let mut ii = small_guide.clone();
    ii.map_in_place(|v| v * v);
    let corr_ii = box_mean(&ii, radius);

    let mut ip = small_guide.clone();
    ip.data_mut()
        .iter_mut()
        .zip(small_image.data().iter())
        .for_each(|(g, &p)| *g *= p);
    let corr_ip = box_mean(&ip, radius);

    let (sw, sh) = small_guide.dimensions();
    let mut a = Plane::new(sw, sh);
    let mut b = Plane::new(sw, sh);
    for i in 0..(sw as usize * sh as usize) {
        let var = corr_ii.data()[i] - mean_i.data()[i] * mean_i.data()[i];
        let cov = corr_ip.data()[i] - mean_i.data()[i] * mean_p.data()[i];
        let ai = cov / (var + eps);
        a.data_mut()[i] = ai;
        b.data_mut()[i] = mean_p.data()[i] - ai * mean_i.data()[i];
    }

    let mut out = Plane::new(w, h);
    out.data_mut()
        .par_chunks_mut(w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let sy = (y as u32 / s).min(sh - 1) as i64;
            for (x, slot) in row.iter_mut().enumerate() {
                let sx = (x as u32 / s).min(sw - 1) as i64;
                *slot = a.at_repeat(sx, sy) * guide.get(x as u32, y as u32)
                    + b.at_repeat(sx, sy);
            }
        });

    out
}

fn stride_sample(plane: &Plane<f32>, s: u32) -> Plane<f32> {
    let (w, h) = plane.dimensions();
    let sw = w.div_ceil(s).max(1);
    let sh = h.div_ceil(s).max(1);
    let mut out = Plane::new(sw, sh);
    for y in 0..sh {
        for x in 0..sw {
            out.set(x, y, plane.get((x * s).min(w - 1), (y * s).min(h - 1)));
        }
    }
    out
}

/// Separable sliding-window box mean with edge-repeat boundaries.
fn box_mean(plane: &Plane<f32>, radius: u32) -> Plane<f32> {
    let (w, h) = plane.dimensions();
    let r = radius as i64;
    let window = (2 * radius + 1) as f32;

    // Horizontal pass.
    let mut horiz = Plane::new(w, h);
    horiz
        .data_mut()
        .par_chunks_mut(w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i64;
            let mut sum = 0.0f32;
            for dx in -r..=r {
                sum += plane.at_repeat(dx, y);
            }
            row[0] = sum / window;
            for x in 1..w as i64 {
                sum -= plane.at_repeat(x - 1 - r, y);
                sum += plane.at_repeat(x + r, y);
                row[x as usize] = sum / window;
            }
        });

    // Vertical pass over the horizontal means.
    let mut out = Plane::new(w, h);
    let out_data = out.data_mut();
    out_data
        .par_chunks_mut(w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i64;
            for (x, slot) in row.iter_mut().enumerate() {
                let mut sum = 0.0f32;
                for dy in -r..=r {
                    sum += horiz.at_repeat(x as i64, y + dy);
                }
                *slot = sum / window;
            }
        });

    out
}
