//! Hot-pixel suppression on the Bayer plane.
//!
//! A stuck sensor photosite reads far above its surroundings. Clamping each
//! sample to the maximum of its four same-color neighbors (distance 2 in a
//! Bayer mosaic) removes isolated outliers and is the identity on locally
//! smooth data.

use rawdev_core::Plane;
use rayon::prelude::*;

/// Clamps each sample to the maximum of its same-color neighbors.
pub fn hot_pixel_suppress(input: &Plane<u16>) -> Plane<u16> {
    let (w, h) = input.dimensions();
    let mut out = Plane::new(w, h);

    out.data_mut()
        .par_chunks_mut(w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i64;
            for (x, slot) in row.iter_mut().enumerate() {
                let x = x as i64;
                let max_neighbor = input
                    .at_repeat(x - 2, y)
                    .max(input.at_repeat(x + 2, y))
                    .max(input.at_repeat(x, y - 2))
                    .max(input.at_repeat(x, y + 2));
                *slot = input.at_repeat(x, y).min(max_neighbor);
            }
        });

    out
}
