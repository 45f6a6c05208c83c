mod common;

use std::cell::RefCell;

use approx::assert_relative_eq;
use edgebench_core::accel::{CancelToken, EmulatedSobel, WaitPolicy};
use edgebench_core::bench::{
    acceleration_ratio, measure, run_benchmark, AccelerationRatio, BenchmarkInputs,
    BenchmarkOptions, BenchmarkResult, BenchmarkStage, NoOpReporter, ProgressReporter,
};
use edgebench_core::error::EdgeBenchError;
use edgebench_core::filters::sobel::{sobel, SoftwareMode};
use edgebench_core::frame::GreyImage;
use edgebench_core::quality::{MseDivisor, PsnrConfig, QualityScore};

use common::{emulated_path, step_image, textured_image, StuckDriver};

#[derive(Default)]
struct RecordingReporter {
    stages: RefCell<Vec<BenchmarkStage>>,
    finished: RefCell<usize>,
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: BenchmarkStage) {
        self.stages.borrow_mut().push(stage);
    }

    fn finish_stage(&self) {
        *self.finished.borrow_mut() += 1;
    }
}

fn emulated(side: usize, mode: SoftwareMode) -> edgebench_core::accel::HardwarePath {
    emulated_path(
        move |memory| Box::new(EmulatedSobel::new(memory, side, mode)),
        side,
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Acceleration ratio
// ---------------------------------------------------------------------------

#[test]
fn test_ratio_regular() {
    let ratio = acceleration_ratio(2.0, 0.5);
    assert_relative_eq!(ratio.value().unwrap(), 4.0);
}

#[test]
fn test_ratio_below_one_when_hardware_slower() {
    assert!(acceleration_ratio(0.1, 0.4).value().unwrap() < 1.0);
}

#[test]
fn test_ratio_zero_hardware_time() {
    assert_eq!(acceleration_ratio(1.0, 0.0), AccelerationRatio::Undefined);
    assert_eq!(acceleration_ratio(0.0, 0.0), AccelerationRatio::Undefined);
    assert!(acceleration_ratio(1.0, 0.0).value().is_none());
}

#[test]
fn test_ratio_non_finite() {
    assert_eq!(
        acceleration_ratio(f64::NAN, 1.0),
        AccelerationRatio::Undefined
    );
    assert_eq!(
        acceleration_ratio(1.0, f64::INFINITY),
        AccelerationRatio::Undefined
    );
}

#[test]
fn test_measure_is_monotonic() {
    let (value, sample) = measure(|| (0..1000u64).sum::<u64>());
    assert_eq!(value, 499_500);
    assert!(sample.end >= sample.start);
    assert!(sample.elapsed_secs() >= 0.0);
}

// ---------------------------------------------------------------------------
// End-to-end runs against the emulated accelerator
// ---------------------------------------------------------------------------

#[test]
fn test_benchmark_matches_golden() {
    let side = 32;
    let input = textured_image(side);
    let golden = sobel(&input);
    let inputs = BenchmarkInputs::new(input, golden.clone()).unwrap();
    let mut hardware = emulated(side, SoftwareMode::Sequential);

    let outcome =
        run_benchmark(&inputs, &mut hardware, &BenchmarkOptions::default(), &NoOpReporter).unwrap();

    assert_eq!(outcome.software_output, golden);
    assert_eq!(outcome.hardware_output, golden);
    assert_eq!(outcome.result.psnr_software, QualityScore::Identical);
    assert_eq!(outcome.result.psnr_hardware, QualityScore::Identical);
    assert!(outcome.result.software_secs >= 0.0);
    assert!(outcome.result.hardware_secs >= 0.0);
}

#[test]
fn test_benchmark_reports_finite_psnr_against_other_golden() {
    let side = 16;
    let input = step_image(side, 8);
    // Golden taken from a different image so both paths differ from it.
    let golden = sobel(&textured_image(side));
    let inputs = BenchmarkInputs::new(input, golden).unwrap();
    let mut hardware = emulated(side, SoftwareMode::Parallel);

    let options = BenchmarkOptions {
        psnr: PsnrConfig {
            divisor: MseDivisor::Interior,
            ..PsnrConfig::default()
        },
        ..BenchmarkOptions::default()
    };
    let outcome = run_benchmark(&inputs, &mut hardware, &options, &NoOpReporter).unwrap();

    let sw = outcome.result.psnr_software.decibels().unwrap();
    let hw = outcome.result.psnr_hardware.decibels().unwrap();
    assert!(sw.is_finite());
    assert_relative_eq!(sw, hw);
}

#[test]
fn test_benchmark_reports_stages_in_order() {
    let side = 8;
    let input = textured_image(side);
    let inputs = BenchmarkInputs::new(input.clone(), sobel(&input)).unwrap();
    let mut hardware = emulated(side, SoftwareMode::Sequential);
    let reporter = RecordingReporter::default();

    run_benchmark(&inputs, &mut hardware, &BenchmarkOptions::default(), &reporter).unwrap();

    assert_eq!(
        *reporter.stages.borrow(),
        vec![
            BenchmarkStage::Loading,
            BenchmarkStage::Software,
            BenchmarkStage::Hardware,
            BenchmarkStage::Comparing,
        ]
    );
    assert_eq!(*reporter.finished.borrow(), 4);
}

#[test]
fn test_benchmark_fails_on_stuck_hardware() {
    let side = 8;
    let input = textured_image(side);
    let inputs = BenchmarkInputs::new(input.clone(), sobel(&input)).unwrap();
    let mut hardware = emulated_path(|_| Box::new(StuckDriver { started: false }), side).unwrap();
    let options = BenchmarkOptions {
        wait: WaitPolicy {
            timeout_ms: 20,
            poll_interval_us: 100,
        },
        ..BenchmarkOptions::default()
    };

    let err = run_benchmark(&inputs, &mut hardware, &options, &NoOpReporter).unwrap_err();
    assert!(matches!(err, EdgeBenchError::DeviceTimeout { .. }));
}

#[test]
fn test_benchmark_cancelled() {
    let side = 8;
    let input = textured_image(side);
    let inputs = BenchmarkInputs::new(input.clone(), sobel(&input)).unwrap();
    let mut hardware = emulated_path(|_| Box::new(StuckDriver { started: false }), side).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();
    let options = BenchmarkOptions {
        cancel: Some(cancel),
        ..BenchmarkOptions::default()
    };

    let err = run_benchmark(&inputs, &mut hardware, &options, &NoOpReporter).unwrap_err();
    assert!(matches!(err, EdgeBenchError::Cancelled));
}

#[test]
fn test_inputs_must_share_side() {
    let err = BenchmarkInputs::new(GreyImage::zeros(8).unwrap(), GreyImage::zeros(9).unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        EdgeBenchError::DimensionMismatch { left: 8, right: 9 }
    ));
}

#[test]
fn test_hardware_side_must_match_input() {
    let inputs = BenchmarkInputs::new(textured_image(12), textured_image(12)).unwrap();
    let mut hardware = emulated(8, SoftwareMode::Sequential);
    let err =
        run_benchmark(&inputs, &mut hardware, &BenchmarkOptions::default(), &NoOpReporter)
            .unwrap_err();
    assert!(matches!(err, EdgeBenchError::DimensionMismatch { .. }));
}

#[test]
fn test_result_serializes() {
    let side = 8;
    let input = textured_image(side);
    let inputs = BenchmarkInputs::new(input.clone(), sobel(&input)).unwrap();
    let mut hardware = emulated(side, SoftwareMode::Sequential);
    let outcome =
        run_benchmark(&inputs, &mut hardware, &BenchmarkOptions::default(), &NoOpReporter).unwrap();

    let json = serde_json::to_string(&outcome.result).unwrap();
    let back: BenchmarkResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, outcome.result);
}

#[test]
fn test_result_toml_roundtrip_with_sentinels() {
    let result = BenchmarkResult {
        software_secs: 1.5,
        hardware_secs: 0.0,
        psnr_software: QualityScore::Identical,
        psnr_hardware: QualityScore::Decibels(36.25),
        acceleration: AccelerationRatio::Undefined,
    };
    let text = toml::to_string_pretty(&result).unwrap();
    let back: BenchmarkResult = toml::from_str(&text).unwrap();
    assert_eq!(back, result);
}
