//! Parameter model and render driver.
//!
//! [`ProcessParams`] is the single aggregate of every knob the pipeline
//! recognizes, constructed per request and read-only during a run.
//! [`run`] validates it, builds the per-request ancillaries (interpolated
//! color matrix, tone-curve LUT, grading LUT, distortion LUT) and executes
//! the fixed kernel chain into a caller-shaped 8-bit buffer.
//!
//! Concurrency model: `run` is synchronous in the caller's thread; the
//! kernels fan out internally over row strips. One request at a time - the
//! caller must not mutate the parameter record while a run is in flight.

pub mod driver;
pub mod error;
pub mod params;
pub mod profile;

pub use driver::{run, RenderOutput};
pub use error::{PipelineError, PipelineResult};
pub use params::{CurveMode, DenoiseMethod, DistortionProfile, ProcessParams, WheelParams};
pub use profile::{Profiler, ScopeTimer};
