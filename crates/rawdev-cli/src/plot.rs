//! Tone-curve visualization: renders the active LUT into a small plot.

use rawdev_core::{Rgb8Buffer, Rgb8Layout};
use rawdev_lut::{ToneCurveLut, ToneCurves};
use rawdev_pipeline::{CurveMode, ProcessParams};

/// Plot dimensions.
const PLOT_WIDTH: u32 = 256;
const PLOT_HEIGHT: u32 = 150;

/// Channel colors for the plot traces.
const TRACE_COLORS: [[u8; 3]; 3] = [[230, 80, 80], [80, 200, 80], [90, 120, 235]];

/// Renders the pipeline tone curve as a small RGB plot.
pub fn render_curve_plot(params: &ProcessParams) -> anyhow::Result<Rgb8Buffer> {
    let curves = match params.curve_mode {
        CurveMode::Luma => ToneCurves {
            luma: &params.curve_luma,
            ..Default::default()
        },
        CurveMode::Rgb => ToneCurves {
            luma: &params.curve_luma,
            r: &params.curve_r,
            g: &params.curve_g,
            b: &params.curve_b,
        },
    };
    let lut = ToneCurveLut::build(
        &curves,
        params.contrast,
        params.gamma,
        params.base_tonemap,
        0,
        65535,
    );

    let mut buf = Rgb8Buffer::new(PLOT_WIDTH, PLOT_HEIGHT, Rgb8Layout::Interleaved);

    // Dark background with a mid grid line.
    for y in 0..PLOT_HEIGHT {
        for x in 0..PLOT_WIDTH {
            let on_grid = x == PLOT_WIDTH / 2 || y == PLOT_HEIGHT / 2;
            let shade = if on_grid { 55 } else { 25 };
            buf.put(x, y, [shade, shade, shade]);
        }
    }

    // One trace per channel, bottom-left origin.
    for (c, color) in TRACE_COLORS.iter().enumerate() {
        for x in 0..PLOT_WIDTH {
            let idx = (x as u64 * 65535 / (PLOT_WIDTH as u64 - 1)) as u16;
            let v = lut.value(idx, c) as f32 / 65535.0;
            let y = ((1.0 - v) * (PLOT_HEIGHT - 1) as f32).round() as u32;
            buf.put(x, y.min(PLOT_HEIGHT - 1), *color);
        }
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_has_expected_shape() {
        let buf = render_curve_plot(&ProcessParams::default()).unwrap();
        assert_eq!(buf.width, PLOT_WIDTH);
        assert_eq!(buf.height, PLOT_HEIGHT);
        assert_eq!(buf.data.len(), (PLOT_WIDTH * PLOT_HEIGHT * 3) as usize);
    }

    #[test]
    fn test_default_curve_touches_corners() {
        // The default S-curve maps 0 to 0 and 1 to 1, so traces hit the
        // bottom-left and top-right plot corners.
        let buf = render_curve_plot(&ProcessParams::default()).unwrap();
        let bottom_left = buf.pixel(0, PLOT_HEIGHT - 1);
        let top_right = buf.pixel(PLOT_WIDTH - 1, 0);
        assert_ne!(bottom_left, [25, 25, 25]);
        assert_ne!(top_right, [25, 25, 25]);
    }
}
