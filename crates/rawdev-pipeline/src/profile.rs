//! Scoped stage timing without global state.
//!
//! The driver owns a [`Profiler`] per request and opens a [`ScopeTimer`]
//! around each stage. The timer records its elapsed time into the profiler
//! when it drops and emits a `tracing` debug event; nothing is written to
//! process-global state.

use std::cell::RefCell;
use std::time::Instant;

/// Per-request collector of stage timings.
#[derive(Debug, Default)]
pub struct Profiler {
    records: RefCell<Vec<(&'static str, f64)>>,
}

impl Profiler {
    /// Creates an empty profiler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a timing scope; the elapsed time records on drop.
    pub fn scope(&self, label: &'static str) -> ScopeTimer<'_> {
        ScopeTimer {
            profiler: self,
            label,
            start: Instant::now(),
        }
    }

    /// Returns the recorded (label, milliseconds) pairs in finish order.
    pub fn records(&self) -> Vec<(&'static str, f64)> {
        self.records.borrow().clone()
    }

    fn record(&self, label: &'static str, ms: f64) {
        self.records.borrow_mut().push((label, ms));
    }
}

/// A live timing scope tied to a [`Profiler`].
#[derive(Debug)]
pub struct ScopeTimer<'a> {
    profiler: &'a Profiler,
    label: &'static str,
    start: Instant,
}

impl ScopeTimer<'_> {
    /// Milliseconds elapsed since the scope opened.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ScopeTimer<'_> {
    fn drop(&mut self) {
        let ms = self.elapsed_ms();
        tracing::debug!(stage = self.label, elapsed_ms = ms, "stage finished");
        self.profiler.record(self.label, ms);
    }
}
