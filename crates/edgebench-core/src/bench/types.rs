/// Benchmark stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BenchmarkStage {
    Loading,
    Software,
    Hardware,
    Comparing,
}

impl std::fmt::Display for BenchmarkStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading device memory"),
            Self::Software => write!(f, "Software Sobel"),
            Self::Hardware => write!(f, "Hardware Sobel"),
            Self::Comparing => write!(f, "Comparing with golden"),
        }
    }
}

/// Progress reporting for the benchmark harness.
///
/// Implementors can use this to drive spinners, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter {
    fn begin_stage(&self, _stage: BenchmarkStage) {}

    fn finish_stage(&self) {}
}

/// No-op progress reporter.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
