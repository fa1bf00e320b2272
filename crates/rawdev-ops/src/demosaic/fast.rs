//! Directional color-difference demosaic (the fast default).
//!
//! Green at R/B sites picks the interpolation direction with the smaller
//! green gradient. Red and blue at the remaining sites are reconstructed by
//! preserving the local color difference against the interpolated green,
//! with a directional choice for R-at-B and B-at-R.

use rawdev_core::RgbImage;

use super::{assemble, green_at_rb, into_rgb, Deinterleaved};

pub(super) fn demosaic_fast(d: &Deinterleaved, w: u32, h: u32) -> RgbImage {
    let (g_at_r, g_at_b) = green_at_rb(d);

    let avg = |a: f32, b: f32| (a + b) / 2.0;

    let green = assemble(w, h, |slot, qx, qy| match slot {
        0 => d.gr.at_repeat(qx, qy),
        1 => g_at_r.at_repeat(qx, qy),
        2 => g_at_b.at_repeat(qx, qy),
        _ => d.gb.at_repeat(qx, qy),
    });

    let red = assemble(w, h, |slot, qx, qy| match slot {
        // At Gr: color difference against green, red from the row.
        0 => {
            let correction = d.gr.at_repeat(qx, qy)
                - avg(g_at_r.at_repeat(qx, qy), g_at_r.at_repeat(qx - 1, qy));
            correction + avg(d.r.at_repeat(qx - 1, qy), d.r.at_repeat(qx, qy))
        }
        1 => d.r.at_repeat(qx, qy),
        // At B: pick the diagonal with the smaller red difference.
        2 => {
            let rp = g_at_b.at_repeat(qx, qy)
                - avg(g_at_r.at_repeat(qx, qy), g_at_r.at_repeat(qx - 1, qy + 1))
                + avg(d.r.at_repeat(qx, qy), d.r.at_repeat(qx - 1, qy + 1));
            let rpd = (d.r.at_repeat(qx, qy) - d.r.at_repeat(qx - 1, qy + 1)).abs();
            let rn = g_at_b.at_repeat(qx, qy)
                - avg(g_at_r.at_repeat(qx - 1, qy), g_at_r.at_repeat(qx, qy + 1))
                + avg(d.r.at_repeat(qx - 1, qy), d.r.at_repeat(qx, qy + 1));
            let rnd = (d.r.at_repeat(qx - 1, qy) - d.r.at_repeat(qx, qy + 1)).abs();
            if rpd < rnd { rp } else { rn }
        }
        // At Gb: color difference against green, red from the column.
        _ => {
            let correction = d.gb.at_repeat(qx, qy)
                - avg(g_at_r.at_repeat(qx, qy), g_at_r.at_repeat(qx, qy + 1));
            correction + avg(d.r.at_repeat(qx, qy), d.r.at_repeat(qx, qy + 1))
        }
    });

    let blue = assemble(w, h, |slot, qx, qy| match slot {
        0 => {
            let correction = d.gr.at_repeat(qx, qy)
                - avg(g_at_b.at_repeat(qx, qy), g_at_b.at_repeat(qx, qy - 1));
            correction + avg(d.b.at_repeat(qx, qy), d.b.at_repeat(qx, qy - 1))
        }
        // At R: pick the diagonal with the smaller blue difference.
        1 => {
            let bp = g_at_r.at_repeat(qx, qy)
                - avg(g_at_b.at_repeat(qx, qy), g_at_b.at_repeat(qx + 1, qy - 1))
                + avg(d.b.at_repeat(qx, qy), d.b.at_repeat(qx + 1, qy - 1));
            let bpd = (d.b.at_repeat(qx, qy) - d.b.at_repeat(qx + 1, qy - 1)).abs();
            let bn = g_at_r.at_repeat(qx, qy)
                - avg(g_at_b.at_repeat(qx + 1, qy), g_at_b.at_repeat(qx, qy - 1))
                + avg(d.b.at_repeat(qx + 1, qy), d.b.at_repeat(qx, qy - 1));
            let bnd = (d.b.at_repeat(qx + 1, qy) - d.b.at_repeat(qx, qy - 1)).abs();
            if bpd < bnd { bp } else { bn }
        }
        2 => d.b.at_repeat(qx, qy),
        _ => {
            let correction = d.gb.at_repeat(qx, qy)
                - avg(g_at_b.at_repeat(qx, qy), g_at_b.at_repeat(qx + 1, qy));
            correction + avg(d.b.at_repeat(qx, qy), d.b.at_repeat(qx + 1, qy))
        }
    });

    into_rgb(red, green, blue)
}
