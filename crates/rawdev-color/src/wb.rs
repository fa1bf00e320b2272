//! Kelvin color temperature to RGB white-balance gains.
//!
//! Standard blackbody-to-RGB fit (the dcraw method): estimate the light
//! color for a given temperature, then invert and normalize so the green
//! gain is 1.0. The processing pipeline white-balances through the
//! interpolated camera matrix; these gains serve hosts that need explicit
//! multipliers (live preview, diagnostics).

/// Per-channel white-balance multipliers, green normalized to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbGains {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl RgbGains {
    /// Neutral gains.
    pub const NEUTRAL: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
}

/// Computes white-balance gains for a color temperature and tint.
///
/// `temp` is in Kelvin (sensible range 1500..15000). Positive `tint` shifts
/// toward magenta (less green), negative toward green.
pub fn kelvin_to_rgb_gains(temp: f32, tint: f32) -> RgbGains {
    let t = temp as f64;

    let (r, g, b) = if t <= 6600.0 {
        let r = 255.0;
        let g = 99.470_802_586_1 * (t / 100.0).ln() - 161.119_568_166_1;
        let b = if t <= 1900.0 {
            0.0
        } else {
            138.517_731_223_1 * ((t - 600.0) / 100.0).ln() - 305.044_792_730_7
        };
        (r, g, b)
    } else {
        let r = 329.698_727_446 * ((t - 6000.0) / 100.0).powf(-0.133_204_759_2);
        let g = 288.122_169_528_3 * ((t - 6000.0) / 100.0).powf(-0.075_514_849_2);
        (r, g, 255.0)
    };

    let r = r.clamp(0.0, 255.0);
    let b = b.clamp(0.0, 255.0);
    // Tint adjusts the estimated light's green component before inversion.
    let g = g.clamp(0.0, 255.0) * (1.0 - tint as f64 * 0.5);

    if r > 1e-6 && g > 1e-6 && b > 1e-6 {
        RgbGains {
            r: (g / r) as f32,
            g: 1.0,
            b: (g / b) as f32,
        }
    } else {
        RgbGains::NEUTRAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warm_light_boosts_blue() {
        // Warm (low-K) light is red-heavy, so balancing it needs b > r gain.
        let gains = kelvin_to_rgb_gains(3200.0, 0.0);
        assert_eq!(gains.g, 1.0);
        assert!(gains.b > gains.r, "gains: {gains:?}");
    }

    #[test]
    fn test_cool_light_boosts_red() {
        let gains = kelvin_to_rgb_gains(10000.0, 0.0);
        assert!(gains.r > gains.b, "gains: {gains:?}");
    }

    #[test]
    fn test_extreme_temperature_is_neutral() {
        // Below 1900 K the blue estimate hits zero; gains fall back to neutral.
        let gains = kelvin_to_rgb_gains(1500.0, 0.0);
        assert_eq!(gains, RgbGains::NEUTRAL);
    }

    #[test]
    fn test_magenta_tint_raises_gains() {
        let neutral = kelvin_to_rgb_gains(5500.0, 0.0);
        let magenta = kelvin_to_rgb_gains(5500.0, 0.5);
        assert!(magenta.r < neutral.r);
        assert!(magenta.b < neutral.b);
    }
}
