//! Color math for the RAW processing pipeline.
//!
//! - [`convert`] - scene-linear sRGB ⇄ XYZ ⇄ CIE Lab ⇄ LCh
//! - [`wb`] - Kelvin color temperature to RGB white-balance gains
//! - [`matrix`] - camera color matrix preparation and interpolation
//!
//! The conversion constants here must stay bit-identical to the values used
//! when the color-grading LUT is built; the grading stage converts pixels
//! with these functions and samples a LUT produced with the same math.

pub mod convert;
pub mod matrix;
pub mod wb;

pub use convert::{
    lab_to_lch, lab_to_xyz, lch_to_lab, linear_srgb_to_xyz, srgb_to_lch, lch_to_srgb,
    xyz_to_lab, xyz_to_linear_srgb,
};
pub use matrix::{illuminant_weight, interpolate_matrix, normalize_offsets};
pub use wb::{kelvin_to_rgb_gains, RgbGains};
