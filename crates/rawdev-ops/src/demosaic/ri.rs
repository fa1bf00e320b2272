//! Residual-interpolation demosaic.
//!
//! Make a tentative bilinear guess for green, measure the guess error
//! (residual) where green is actually known, interpolate that error map and
//! add it back. Red and blue then follow from the final green plus
//! bilinearly interpolated color differences at the native sites.

use rawdev_core::{Plane, RgbImage};
use rayon::prelude::*;

use super::{into_rgb, Deinterleaved};

pub(super) fn demosaic_ri(d: &Deinterleaved, w: u32, h: u32) -> RgbImage {
    let (hw, hh) = d.gr.dimensions();

    let avg = |a: f32, b: f32| (a + b) / 2.0;
    let avg4 = |a: f32, b: f32, c: f32, e: f32| (a + b + c + e) / 4.0;

    // Tentative bilinear green at R and B sites.
    let mut g_tent_r = Plane::new(hw, hh);
    let mut g_tent_b = Plane::new(hw, hh);
    for y in 0..hh as i64 {
        for x in 0..hw as i64 {
            g_tent_r.set(
                x as u32,
                y as u32,
                avg4(
                    d.gr.at_repeat(x, y),
                    d.gr.at_repeat(x + 1, y),
                    d.gb.at_repeat(x, y),
                    d.gb.at_repeat(x, y - 1),
                ),
            );
            g_tent_b.set(
                x as u32,
                y as u32,
                avg4(
                    d.gr.at_repeat(x, y),
                    d.gr.at_repeat(x, y + 1),
                    d.gb.at_repeat(x, y),
                    d.gb.at_repeat(x - 1, y),
                ),
            );
        }
    }

    // Residuals at the native green sites.
    let mut res_gr = Plane::new(hw, hh);
    let mut res_gb = Plane::new(hw, hh);
    for y in 0..hh as i64 {
        for x in 0..hw as i64 {
            res_gr.set(
                x as u32,
                y as u32,
                d.gr.at_repeat(x, y) - avg(g_tent_r.at_repeat(x, y), g_tent_r.at_repeat(x - 1, y)),
            );
            res_gb.set(
                x as u32,
                y as u32,
                d.gb.at_repeat(x, y) - avg(g_tent_b.at_repeat(x, y), g_tent_b.at_repeat(x, y + 1)),
            );
        }
    }

    // Corrected green: tentative plus interpolated residual.
    let mut g_corr_r = Plane::new(hw, hh);
    let mut g_corr_b = Plane::new(hw, hh);
    for y in 0..hh as i64 {
        for x in 0..hw as i64 {
            g_corr_r.set(
                x as u32,
                y as u32,
                g_tent_r.at_repeat(x, y)
                    + avg(res_gr.at_repeat(x, y), res_gr.at_repeat(x - 1, y)),
            );
            g_corr_b.set(
                x as u32,
                y as u32,
                g_tent_b.at_repeat(x, y)
                    + avg(res_gb.at_repeat(x, y), res_gb.at_repeat(x, y + 1)),
            );
        }
    }

    // Color differences at native R and B sites.
    let mut cd_r = Plane::new(hw, hh);
    let mut cd_b = Plane::new(hw, hh);
    for y in 0..hh {
        for x in 0..hw {
            cd_r.set(x, y, d.r.get(x, y) - d.gr.get(x, y));
            cd_b.set(x, y, d.b.get(x, y) - d.gb.get(x, y));
        }
    }

    // Full-resolution assembly.
    let mut green = Plane::new(w, h);
    let mut red = Plane::new(w, h);
    let mut blue = Plane::new(w, h);

    green
        .data_mut()
        .par_chunks_mut(w as usize)
        .zip(red.data_mut().par_chunks_mut(w as usize))
        .zip(blue.data_mut().par_chunks_mut(w as usize))
        .enumerate()
        .for_each(|(y, ((g_row, r_row), b_row))| {
            let yq = (y / 2) as i64;
            let y_odd = y & 1 == 1;
            for x in 0..w as usize {
                let xq = (x / 2) as i64;
                let x_odd = x & 1 == 1;

                let g = match (x_odd, y_odd) {
                    (false, false) => d.gr.at_repeat(xq, yq),
                    (true, false) => g_corr_r.at_repeat(xq, yq),
                    (false, true) => g_corr_b.at_repeat(xq, yq),
                    (true, true) => d.gb.at_repeat(xq, yq),
                };

                let cdr = avg4(
                    cd_r.at_repeat(xq, yq),
                    cd_r.at_repeat(xq - 1, yq),
                    cd_r.at_repeat(xq, yq - 1),
                    cd_r.at_repeat(xq - 1, yq - 1),
                );
                let cdb = avg4(
                    cd_b.at_repeat(xq, yq),
                    cd_b.at_repeat(xq - 1, yq),
                    cd_b.at_repeat(xq, yq - 1),
                    cd_b.at_repeat(xq - 1, yq - 1),
                );

                g_row[x] = g.clamp(0.0, 65535.0);
                r_row[x] = (g + cdr).clamp(0.0, 65535.0);
                b_row[x] = (g + cdb).clamp(0.0, 65535.0);
            }
        });

    into_rgb(red, green, blue)
}
