//! Automatic chromatic-aberration correction on the Bayer plane.
//!
//! Lateral CA shifts the red and blue images slightly against green. The
//! kernel estimates that shift per 32x32 tile with a least-squares fit of
//! the R/B-to-green differences against the local green gradient, smooths
//! the tile grid with a 9x9 box blur into a global shift field, and
//! resamples each R and B site from the interpolated green plane:
//! `corrected = native + G(native) - G(shifted)`.
//!
//! The fit denominator is guarded at 0.001 and shifts clamp to +/-3.99
//! sensor pixels; tiles without usable gradient contribute zero shift.

use rawdev_core::Plane;
use rawdev_math::lerp;
use rayon::prelude::*;

const TILE: u32 = 32;
const SHIFT_LIMIT: f32 = 3.99;
const DEN_THRESH: f32 = 0.001;

/// Per-tile shift estimates: [R-vert, R-horiz, B-vert, B-horiz].
struct ShiftGrid {
    data: Vec<[f32; 4]>,
    bw: u32,
    bh: u32,
}

impl ShiftGrid {
    #[inline]
    fn at(&self, bx: i64, by: i64) -> [f32; 4] {
        let cx = bx.clamp(0, self.bw as i64 - 1) as usize;
        let cy = by.clamp(0, self.bh as i64 - 1) as usize;
        self.data[cy * self.bw as usize + cx]
    }

    /// Bilinear sample of one component at fractional grid coordinates.
    fn sample(&self, fx: f32, fy: f32, comp: usize) -> f32 {
        let x0 = fx.floor();
        let y0 = fy.floor();
        let wx = fx - x0;
        let wy = fy - y0;
        let (xi, yi) = (x0 as i64, y0 as i64);
        let v00 = self.at(xi, yi)[comp];
        let v10 = self.at(xi + 1, yi)[comp];
        let v01 = self.at(xi, yi + 1)[comp];
        let v11 = self.at(xi + 1, yi + 1)[comp];
        lerp(lerp(v00, v10, wx), lerp(v01, v11, wx), wy)
    }
}

/// Corrects lateral chromatic aberration on a GRBG Bayer plane.
///
/// Bypasses (returns the input unchanged) below strength 0.001.
pub fn ca_correct(input: &Plane<u16>, black: u16, white: u16, strength: f32) -> Plane<u16> {
    if strength < 0.001 {
        return input.clone();
    }

    let (w, h) = input.dimensions();
    let range = (white as f32 - black as f32).max(1.0);

    // Normalized float copy of the mosaic.
    let mut norm = Plane::new(w, h);
    norm.data_mut()
        .par_iter_mut()
        .zip(input.data().par_iter())
        .for_each(|(dst, &src)| *dst = (src as f32 - black as f32) / range);

    let g_interp = interpolate_green(&norm);

    // Least-squares shift per tile.
    let bw = w.div_ceil(TILE);
    let bh = h.div_ceil(TILE);
    let mut grid = ShiftGrid {
        data: vec![[0.0; 4]; bw as usize * bh as usize],
        bw,
        bh,
    };

    grid.data
        .par_chunks_mut(bw as usize)
        .enumerate()
        .for_each(|(by, grid_row)| {
            for (bx, cell) in grid_row.iter_mut().enumerate() {
                // Accumulators: [R-v, R-h, B-v, B-h] numerator/denominator.
                let mut num = [0.0f64; 4];
                let mut den = [0.0f64; 4];
                for ry in 0..TILE {
                    let y = (by as u32 * TILE + ry) as i64;
                    for rx in 0..TILE {
                        let x = (bx as u32 * TILE + rx) as i64;
                        let is_r = y % 2 == 0 && x % 2 == 1;
                        let is_b = y % 2 == 1 && x % 2 == 0;
                        if !is_r && !is_b {
                            continue;
                        }
                        let deltgrb =
                            (g_interp.at_repeat(x, y) - norm.at_repeat(x, y)) as f64;
                        let gdiff_h = (g_interp.at_repeat(x + 1, y)
                            - g_interp.at_repeat(x - 1, y)) as f64;
                        let gdiff_v = (g_interp.at_repeat(x, y + 1)
                            - g_interp.at_repeat(x, y - 1)) as f64;
                        let base = if is_r { 0 } else { 2 };
                        num[base] += deltgrb * gdiff_v;
                        den[base] += gdiff_v * gdiff_v;
                        num[base + 1] += deltgrb * gdiff_h;
                        den[base + 1] += gdiff_h * gdiff_h;
                    }
                }
                for i in 0..4 {
                    let shift = if den[i] > DEN_THRESH as f64 {
                        (num[i] / den[i]) as f32
                    } else {
                        0.0
                    };
                    cell[i] = shift.clamp(-SHIFT_LIMIT, SHIFT_LIMIT);
                }
            }
        });

    let blurred = blur_grid(&grid);

    // Resample R and B from the shifted green plane.
    let mut out = Plane::new(w, h);
    out.data_mut()
        .par_chunks_mut(w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let fy = y as f32 / TILE as f32;
            for (x, slot) in row.iter_mut().enumerate() {
                let yi = y as i64;
                let xi = x as i64;
                let is_r = yi % 2 == 0 && xi % 2 == 1;
                let is_b = yi % 2 == 1 && xi % 2 == 0;
                if !is_r && !is_b {
                    *slot = input.get(x as u32, y as u32);
                    continue;
                }
                let fx = x as f32 / TILE as f32;
                let base = if is_r { 0 } else { 2 };
                let shift_v = blurred.sample(fx, fy, base).clamp(-4.0, 4.0) * strength;
                let shift_h = blurred.sample(fx, fy, base + 1).clamp(-4.0, 4.0) * strength;

                let native = norm.get(x as u32, y as u32);
                let corrected = native + g_interp.get(x as u32, y as u32)
                    - g_interp.sample_bilinear(x as f32 + shift_h, y as f32 + shift_v);
                *slot = (corrected * range + black as f32 + 0.5).clamp(0.0, 65535.0) as u16;
            }
        });

    out
}

/// Gradient-weighted green interpolation over the full mosaic.
///
/// Green sites keep their value; R and B sites blend the four green
/// neighbors weighted by the inverse directional gradients.
fn interpolate_green(norm: &Plane<f32>) -> Plane<f32> {
    let (w, h) = norm.dimensions();
    let mut out = Plane::new(w, h);
    out.data_mut()
        .par_chunks_mut(w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let yi = y as i64;
            for (x, slot) in row.iter_mut().enumerate() {
                let xi = x as i64;
                if (xi + yi) % 2 == 0 {
                    *slot = norm.get(x as u32, y as u32);
                    continue;
                }
                let n = norm.at_repeat(xi, yi - 1);
                let s = norm.at_repeat(xi, yi + 1);
                let wv = norm.at_repeat(xi - 1, yi);
                let e = norm.at_repeat(xi + 1, yi);

                let weight_v = 1.0 / (1e-5 + (n - s).abs());
                let weight_h = 1.0 / (1e-5 + (wv - e).abs());
                *slot = ((n + s) * weight_v + (wv + e) * weight_h)
                    / (2.0 * weight_v + 2.0 * weight_h);
            }
        });
    out
}

/// 9x9 box blur over the tile grid, edge-repeat.
fn blur_grid(grid: &ShiftGrid) -> ShiftGrid {
    let (bw, bh) = (grid.bw, grid.bh);
    let mut horiz = vec![[0.0f32; 4]; bw as usize * bh as usize];
    for by in 0..bh as i64 {
        for bx in 0..bw as i64 {
            let mut acc = [0.0f32; 4];
            for d in -4..=4 {
                let v = grid.at(bx + d, by);
                for i in 0..4 {
                    acc[i] += v[i];
                }
            }
            horiz[by as usize * bw as usize + bx as usize] = acc;
        }
    }
    let horiz_grid = ShiftGrid {
        data: horiz,
        bw,
        bh,
    };
    let mut out = vec![[0.0f32; 4]; bw as usize * bh as usize];
    for by in 0..bh as i64 {
        for bx in 0..bw as i64 {
            let mut acc = [0.0f32; 4];
            for d in -4..=4 {
                let v = horiz_grid.at(bx, by + d);
                for i in 0..4 {
                    acc[i] += v[i];
                }
            }
            for a in &mut acc {
                *a /= 81.0;
            }
            out[by as usize * bw as usize + bx as usize] = acc;
        }
    }
    ShiftGrid { data: out, bw, bh }
}
