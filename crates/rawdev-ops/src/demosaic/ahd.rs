//! Adaptive homogeneity-directed demosaic variant.
//!
//! Same gradient-directed green as the fast path; red and blue at green
//! sites preserve color differences, and red-at-blue / blue-at-red average
//! the color difference over the four diagonal neighbors.

use rawdev_core::RgbImage;

use super::{assemble, green_at_rb, into_rgb, Deinterleaved};

pub(super) fn demosaic_ahd(d: &Deinterleaved, w: u32, h: u32) -> RgbImage {
    let (g_at_r, g_at_b) = green_at_rb(d);

    let avg = |a: f32, b: f32| (a + b) / 2.0;
    let avg4 = |a: f32, b: f32, c: f32, e: f32| (a + b + c + e) / 4.0;

    let r_at_g = |qx: i64, qy: i64| {
        let r_h_avg = avg(d.r.at_repeat(qx, qy), d.r.at_repeat(qx - 1, qy));
        let correction = d.gr.at_repeat(qx, qy)
            - avg(g_at_r.at_repeat(qx, qy), g_at_r.at_repeat(qx - 1, qy));
        r_h_avg + correction
    };
    let b_at_g = |qx: i64, qy: i64| {
        let b_v_avg = avg(d.b.at_repeat(qx, qy), d.b.at_repeat(qx, qy - 1));
        let correction = d.gr.at_repeat(qx, qy)
            - avg(g_at_b.at_repeat(qx, qy), g_at_b.at_repeat(qx, qy - 1));
        b_v_avg + correction
    };
    let r_at_b = |qx: i64, qy: i64| {
        g_at_b.at_repeat(qx, qy)
            + avg4(
                d.r.at_repeat(qx - 1, qy) - g_at_r.at_repeat(qx - 1, qy),
                d.r.at_repeat(qx, qy) - g_at_r.at_repeat(qx, qy),
                d.r.at_repeat(qx - 1, qy + 1) - g_at_r.at_repeat(qx - 1, qy + 1),
                d.r.at_repeat(qx, qy + 1) - g_at_r.at_repeat(qx, qy + 1),
            )
    };
    let b_at_r = |qx: i64, qy: i64| {
        g_at_r.at_repeat(qx, qy)
            + avg4(
                d.b.at_repeat(qx, qy) - g_at_b.at_repeat(qx, qy),
                d.b.at_repeat(qx + 1, qy) - g_at_b.at_repeat(qx + 1, qy),
                d.b.at_repeat(qx, qy + 1) - g_at_b.at_repeat(qx, qy + 1),
                d.b.at_repeat(qx + 1, qy + 1) - g_at_b.at_repeat(qx + 1, qy + 1),
            )
    };

    let green = assemble(w, h, |slot, qx, qy| match slot {
        0 => d.gr.at_repeat(qx, qy),
        1 => g_at_r.at_repeat(qx, qy),
        2 => g_at_b.at_repeat(qx, qy),
        _ => d.gb.at_repeat(qx, qy),
    });

    let red = assemble(w, h, |slot, qx, qy| match slot {
        0 => r_at_g(qx, qy),
        1 => d.r.at_repeat(qx, qy),
        2 => r_at_b(qx, qy),
        _ => r_at_g(qx, qy),
    });

    let blue = assemble(w, h, |slot, qx, qy| match slot {
        0 => b_at_g(qx, qy),
        1 => b_at_r(qx, qy),
        2 => d.b.at_repeat(qx, qy),
        _ => b_at_g(qx, qy),
    });

    into_rgb(red, green, blue)
}
