//! Bayer color filter array patterns.
//!
//! Sensors arrange one color per pixel in a repeating 2x2 quad:
//!
//! ```text
//! GRBG:     RGGB:     GBRG:     BGGR:
//! G R G R   R G R G   G B G B   B G B G
//! B G B G   G B G B   R G R G   G R G R
//! ```
//!
//! The pipeline normalizes every input to GRBG before demosaicing. Instead
//! of per-pattern conditionals, each pattern carries a quad-offset table:
//! for each of the four GRBG slots (Gr, R, B, Gb) the (dx, dy) of that color
//! within the source 2x2 quad.

use crate::{Error, Result};

/// Slot order used by the quad-offset tables: Gr, R, B, Gb.
///
/// Gr is the green sample on the red row, Gb the green sample on the blue
/// row. In the normalized GRBG quad they sit at (0,0), (1,0), (0,1), (1,1).
pub const GRBG_SLOTS: usize = 4;

/// Bayer pattern arrangement of the top-left 2x2 quad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CfaPattern {
    /// Green-Red / Blue-Green (reference pattern of the pipeline)
    #[default]
    Grbg,
    /// Red-Green / Green-Blue
    Rggb,
    /// Green-Blue / Red-Green
    Gbrg,
    /// Blue-Green / Green-Red
    Bggr,
}

impl CfaPattern {
    /// Parses the integer pattern code used by RAW metadata
    /// (GRBG=0, RGGB=1, GBRG=2, BGGR=3).
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(CfaPattern::Grbg),
            1 => Ok(CfaPattern::Rggb),
            2 => Ok(CfaPattern::Gbrg),
            3 => Ok(CfaPattern::Bggr),
            other => Err(Error::UnknownCfaPattern(other)),
        }
    }

    /// Parses a pattern name, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GRBG" => Some(CfaPattern::Grbg),
            "RGGB" => Some(CfaPattern::Rggb),
            "GBRG" => Some(CfaPattern::Gbrg),
            "BGGR" => Some(CfaPattern::Bggr),
            _ => None,
        }
    }

    /// Returns the integer pattern code.
    #[inline]
    pub fn code(&self) -> u8 {
        match self {
            CfaPattern::Grbg => 0,
            CfaPattern::Rggb => 1,
            CfaPattern::Gbrg => 2,
            CfaPattern::Bggr => 3,
        }
    }

    /// Returns the source-quad offsets for the four GRBG slots.
    ///
    /// Index by [Gr, R, B, Gb]; each entry is the (dx, dy) within the source
    /// 2x2 quad where that color lives for this pattern.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rawdev_core::CfaPattern;
    ///
    /// // In an RGGB quad, red sits at the top-left corner.
    /// let offsets = CfaPattern::Rggb.grbg_offsets();
    /// assert_eq!(offsets[1], (0, 0));
    /// ```
    #[inline]
    pub fn grbg_offsets(&self) -> [(u32, u32); GRBG_SLOTS] {
        // Slot order: Gr, R, B, Gb.
        match self {
            CfaPattern::Grbg => [(0, 0), (1, 0), (0, 1), (1, 1)],
            CfaPattern::Rggb => [(1, 0), (0, 0), (1, 1), (0, 1)],
            CfaPattern::Gbrg => [(1, 1), (0, 1), (1, 0), (0, 0)],
            CfaPattern::Bggr => [(0, 1), (1, 1), (0, 0), (1, 0)],
        }
    }

    /// Returns the color at quad position (0=R, 1=G, 2=B).
    #[inline]
    pub fn color_at(&self, x: u32, y: u32) -> usize {
        let offsets = self.grbg_offsets();
        let pos = (x & 1, y & 1);
        if pos == offsets[1] {
            0
        } else if pos == offsets[2] {
            2
        } else {
            1
        }
    }
}

impl std::fmt::Display for CfaPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CfaPattern::Grbg => "GRBG",
            CfaPattern::Rggb => "RGGB",
            CfaPattern::Gbrg => "GBRG",
            CfaPattern::Bggr => "BGGR",
        };
        f.write_str(name)
    }
}
