use serde::{Deserialize, Serialize};
use tracing::info;

use crate::accel::{CancelToken, HardwarePath, WaitPolicy};
use crate::error::{EdgeBenchError, Result};
use crate::filters::sobel::{sobel_with_mode, SoftwareMode};
use crate::frame::GreyImage;
use crate::quality::{psnr, PsnrConfig, QualityScore};

use super::timing::measure;
use super::types::{BenchmarkStage, ProgressReporter};

/// Software time divided by hardware time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AccelerationRatio {
    Ratio(f64),
    /// Hardware time was zero (or a timing was not finite).
    Undefined,
}

impl AccelerationRatio {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Ratio(r) => Some(*r),
            Self::Undefined => None,
        }
    }
}

impl std::fmt::Display for AccelerationRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ratio(r) => write!(f, "{r:.6}"),
            Self::Undefined => write!(f, "undefined (zero hardware time)"),
        }
    }
}

/// `software_secs / hardware_secs`, guarded against a zero denominator.
pub fn acceleration_ratio(software_secs: f64, hardware_secs: f64) -> AccelerationRatio {
    if hardware_secs <= 0.0 || !hardware_secs.is_finite() || !software_secs.is_finite() {
        return AccelerationRatio::Undefined;
    }
    AccelerationRatio::Ratio(software_secs / hardware_secs)
}

/// Timing and quality figures of one benchmark run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub software_secs: f64,
    pub hardware_secs: f64,
    pub psnr_software: QualityScore,
    pub psnr_hardware: QualityScore,
    pub acceleration: AccelerationRatio,
}

/// The frames a benchmark run consumes.
#[derive(Clone, Debug)]
pub struct BenchmarkInputs {
    pub input: GreyImage,
    pub golden: GreyImage,
}

impl BenchmarkInputs {
    pub fn new(input: GreyImage, golden: GreyImage) -> Result<Self> {
        if input.side() != golden.side() {
            return Err(EdgeBenchError::DimensionMismatch {
                left: input.side(),
                right: golden.side(),
            });
        }
        Ok(Self { input, golden })
    }
}

#[derive(Clone, Debug, Default)]
pub struct BenchmarkOptions {
    pub software: SoftwareMode,
    pub wait: WaitPolicy,
    pub psnr: PsnrConfig,
    pub cancel: Option<CancelToken>,
}

/// Result figures plus both computed frames.
#[derive(Clone, Debug)]
pub struct BenchmarkOutcome {
    pub result: BenchmarkResult,
    pub software_output: GreyImage,
    pub hardware_output: GreyImage,
}

/// Run the software and hardware Sobel paths back to back and compare
/// both against the golden frame.
///
/// Device memory is loaded before either timer starts. Each path runs
/// once; a hardware path that does not finish within `options.wait` ends
/// the run with an error instead of a partial result.
pub fn run_benchmark(
    inputs: &BenchmarkInputs,
    hardware: &mut HardwarePath,
    options: &BenchmarkOptions,
    reporter: &dyn ProgressReporter,
) -> Result<BenchmarkOutcome> {
    let side = inputs.input.side();
    info!(side, device = hardware.name(), "Starting benchmark");

    reporter.begin_stage(BenchmarkStage::Loading);
    hardware.load(&inputs.input)?;
    reporter.finish_stage();

    reporter.begin_stage(BenchmarkStage::Software);
    let (software_output, software_time) =
        measure(|| sobel_with_mode(&inputs.input, options.software));
    let software_secs = software_time.elapsed_secs();
    info!(software_secs, mode = %options.software, "Software path finished");
    reporter.finish_stage();

    reporter.begin_stage(BenchmarkStage::Hardware);
    let (run, hardware_time) = measure(|| hardware.run(&options.wait, options.cancel.as_ref()));
    run?;
    let hardware_secs = hardware_time.elapsed_secs();
    info!(hardware_secs, "Hardware path finished");
    reporter.finish_stage();

    reporter.begin_stage(BenchmarkStage::Comparing);
    let hardware_output = hardware.read_output()?;
    let psnr_software = psnr(&software_output, &inputs.golden, &options.psnr)?;
    let psnr_hardware = psnr(&hardware_output, &inputs.golden, &options.psnr)?;
    reporter.finish_stage();

    let acceleration = acceleration_ratio(software_secs, hardware_secs);
    info!(
        psnr_software = %psnr_software,
        psnr_hardware = %psnr_hardware,
        acceleration = %acceleration,
        "Benchmark complete"
    );

    Ok(BenchmarkOutcome {
        result: BenchmarkResult {
            software_secs,
            hardware_secs,
            psnr_software,
            psnr_hardware,
            acceleration,
        },
        software_output,
        hardware_output,
    })
}
