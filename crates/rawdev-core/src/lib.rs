//! Core types for RAW image processing: planar buffers, CFA patterns, errors.
//!
//! This crate provides the data containers shared by the whole pipeline:
//!
//! - [`Plane`] - Owned single-channel 2D buffer (Bayer data, luma, guides)
//! - [`RgbImage`] - 3-channel planar floating-point processing buffer
//! - [`CfaPattern`] - Bayer color filter array layouts
//! - [`Error`] - Unified error type for buffer operations
//!
//! # Memory Layout
//!
//! Planes store samples in **row-major** order, top-to-bottom. [`RgbImage`]
//! keeps one contiguous plane per channel (planar, not interleaved) because
//! every pipeline stage reads whole channels; interleaving would defeat both
//! vectorization and the per-channel lens resampling.
//!
//! # Boundary Handling
//!
//! Kernels that look outside the image use the edge-repeat accessors
//! ([`Plane::at_repeat`], [`Plane::sample_bilinear`]). These are the only
//! places where coordinates are clamped; kernels themselves never clamp.

pub mod cfa;
pub mod error;
pub mod image;
pub mod plane;

pub use cfa::CfaPattern;
pub use error::{Error, Result};
pub use image::{Rgb8Buffer, Rgb8Layout, RgbImage};
pub use plane::Plane;
