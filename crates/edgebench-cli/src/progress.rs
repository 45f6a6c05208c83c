use std::time::Duration;

use anyhow::Result;
use edgebench_core::bench::{BenchmarkStage, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner that shows the current benchmark stage.
pub struct SpinnerReporter {
    pb: ProgressBar,
}

impl SpinnerReporter {
    pub fn new() -> Result<Self> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        Ok(Self { pb })
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl ProgressReporter for SpinnerReporter {
    fn begin_stage(&self, stage: BenchmarkStage) {
        self.pb.set_message(stage.to_string());
    }

    fn finish_stage(&self) {
        self.pb.tick();
    }
}
