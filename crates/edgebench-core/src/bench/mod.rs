mod harness;
pub mod timing;
mod types;

pub use harness::{
    acceleration_ratio, run_benchmark, AccelerationRatio, BenchmarkInputs, BenchmarkOptions,
    BenchmarkOutcome, BenchmarkResult,
};
pub use timing::{measure, TimingSample};
pub use types::{BenchmarkStage, NoOpReporter, ProgressReporter};
