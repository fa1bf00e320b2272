//! RAW input normalization and PNG helpers.
//!
//! Container parsing is a collaborator's job; this crate receives the
//! decoded Bayer plane plus sensor metadata and normalizes it into the
//! [`RawImage`] the pipeline consumes (CFA code mapping, color-matrix
//! preparation, fallback DNG matrices).
//!
//! Two PNG conveniences ride along: a test-only "raw PNG" input shortcut
//! (16-bit grayscale mosaic with fixed levels) and the 8-bit RGB writer the
//! CLI uses for output.

pub mod error;
pub mod png_io;
pub mod raw;

pub use error::{IoError, IoResult};
pub use png_io::{load_raw_png, write_png8};
pub use raw::RawImage;
