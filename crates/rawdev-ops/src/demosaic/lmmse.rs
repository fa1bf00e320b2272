//! LMMSE-style demosaic variant.
//!
//! Green is identical to the AHD variant. Red and blue at green sites use
//! the color difference anchored at the Gr sample; red-at-blue and
//! blue-at-red reuse the AHD 4-neighbor color-difference rule.

use rawdev_core::RgbImage;

use super::{assemble, green_at_rb, into_rgb, Deinterleaved};

pub(super) fn demosaic_lmmse(d: &Deinterleaved, w: u32, h: u32) -> RgbImage {
    let (g_at_r, g_at_b) = green_at_rb(d);

    let avg = |a: f32, b: f32| (a + b) / 2.0;
    let avg4 = |a: f32, b: f32, c: f32, e: f32| (a + b + c + e) / 4.0;

    let r_at_g = |qx: i64, qy: i64| {
        let r_h_avg = avg(d.r.at_repeat(qx, qy), d.r.at_repeat(qx - 1, qy));
        let gr_h_avg = avg(d.gr.at_repeat(qx, qy), d.gr.at_repeat(qx - 1, qy));
        d.gr.at_repeat(qx, qy) + (r_h_avg - gr_h_avg)
    };
    let b_at_g = |qx: i64, qy: i64| {
        let b_v_avg = avg(d.b.at_repeat(qx, qy), d.b.at_repeat(qx, qy - 1));
        let gr_v_avg = avg(d.gr.at_repeat(qx, qy), d.gr.at_repeat(qx, qy - 1));
        d.gr.at_repeat(qx, qy) + (b_v_avg - gr_v_avg)
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
