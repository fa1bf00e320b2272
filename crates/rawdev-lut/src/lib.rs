//! Host-side LUT builders for the RAW processing pipeline.
//!
//! All lookup tables are built once per render request on the host and
//! handed to the kernels read-only:
//!
//! - [`tone_curve`] - 65 536 x 3 `u16` display tone curve
//! - [`grading`] - 33x33x33 L*C*h color-grading cube
//! - [`distortion`] - 2048-entry inverse lens-distortion table

pub mod distortion;
pub mod grading;
pub mod tone_curve;

pub use distortion::{DistortionLut, DistortionModel, DISTORTION_LUT_SIZE};
pub use grading::{GradingLut, GradingParams, Wheel, GRADING_LUT_SIZE};
pub use tone_curve::{average_rgb_to_luma, ToneCurveLut, ToneCurves, TONE_LUT_SIZE};
