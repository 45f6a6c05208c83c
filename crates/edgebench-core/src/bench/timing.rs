use std::time::{Duration, Instant};

/// Monotonic start/end timestamps of one measured section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingSample {
    pub start: Instant,
    pub end: Instant,
}

impl TimingSample {
    pub fn elapsed(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }

    /// Elapsed wall-clock seconds, never negative.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

/// Run `f` between two monotonic timestamps.
pub fn measure<T>(f: impl FnOnce() -> T) -> (T, TimingSample) {
    let start = Instant::now();
    let value = f();
    let end = Instant::now();
    (value, TimingSample { start, end })
}
