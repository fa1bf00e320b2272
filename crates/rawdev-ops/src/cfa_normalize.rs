//! CFA normalization: any Bayer layout to GRBG, plus green balance.
//!
//! Downstream stages assume GRBG. For each output pixel the kernel finds
//! its 2x2 quad origin and reads the source offset for the pixel's GRBG
//! slot from the pattern's quad-offset table. The green-balance multiplier
//! compensates Gr/Gb response mismatch and applies to the Gb slot only,
//! which in GRBG is the (odd, odd) position.

use rawdev_core::{CfaPattern, Plane};
use rayon::prelude::*;

/// Normalizes a Bayer plane to GRBG and applies green balance.
pub fn cfa_normalize(input: &Plane<u16>, pattern: CfaPattern, green_balance: f32) -> Plane<u16> {
    let (w, h) = input.dimensions();
    let offsets = pattern.grbg_offsets();
    let mut out = Plane::new(w, h);

    out.data_mut()
        .par_chunks_mut(w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            let qy = (y / 2) * 2;
            let y_odd = y & 1 == 1;
            for (x, slot) in row.iter_mut().enumerate() {
                let x = x as u32;
                let qx = (x / 2) * 2;
                let x_odd = x & 1 == 1;
                // GRBG slot of this output position: Gr, R, B or Gb.
                let slot_idx = match (x_odd, y_odd) {
                    (false, false) => 0,
                    (true, false) => 1,
                    (false, true) => 2,
                    (true, true) => 3,
                };
                let (dx, dy) = offsets[slot_idx];
                let sx = (qx + dx).min(w - 1);
                let sy = (qy + dy).min(h - 1);
                let val = input.get(sx, sy);

                *slot = if x_odd && y_odd {
                    (val as f32 * green_balance).clamp(0.0, 65535.0) as u16
                } else {
                    val
                };
            }
        });

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a plane where each sample encodes its quad position.
    fn patterned_plane(pattern: CfaPattern) -> Plane<u16> {
        // Mark R=1000, Gr=2000, Gb=3000, B=4000 at their physical sites.
        let mut p = Plane::new(4, 4);
        let offsets = pattern.grbg_offsets();
        for qy in (0..4).step_by(2) {
            for qx in (0..4).step_by(2) {
                p.set(qx + offsets[0].0, qy + offsets[0].1, 2000);
                p.set(qx + offsets[1].0, qy + offsets[1].1, 1000);
                p.set(qx + offsets[2].0, qy + offsets[2].1, 4000);
                p.set(qx + offsets[3].0, qy + offsets[3].1, 3000);
            }
        }
        p
    }

    #[test]
    fn test_normalize_each_pattern_to_grbg() {
        for code in 0..4u8 {
            let pattern = CfaPattern::from_code(code).unwrap();
            let input = patterned_plane(pattern);
            let out = cfa_normalize(&input, pattern, 1.0);
            // Output must read as GRBG: Gr(0,0), R(1,0), B(0,1), Gb(1,1).
            assert_eq!(out.get(0, 0), 2000, "{pattern} Gr");
            assert_eq!(out.get(1, 0), 1000, "{pattern} R");
            assert_eq!(out.get(0, 1), 4000, "{pattern} B");
            assert_eq!(out.get(1, 1), 3000, "{pattern} Gb");
        }
    }

    #[test]
    fn test_green_balance_hits_gb_only() {
        let input = Plane::filled(4, 4, 1000u16);
        let out = cfa_normalize(&input, CfaPattern::Grbg, 1.5);
        assert_eq!(out.get(0, 0), 1000);
        assert_eq!(out.get(1, 0), 1000);
        assert_eq!(out.get(0, 1), 1000);
        assert_eq!(out.get(1, 1), 1500);
        assert_eq!(out.get(3, 3), 1500);
    }

    #[test]
    fn test_green_balance_saturates() {
        let input = Plane::filled(2, 2, 60000u16);
        let out = cfa_normalize(&input, CfaPattern::Grbg, 2.0);
        assert_eq!(out.get(1, 1), 65535);
    }
}
