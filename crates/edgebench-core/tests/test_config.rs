use std::path::PathBuf;

use edgebench_core::accel::DeviceKind;
use edgebench_core::config::BenchmarkConfig;
use edgebench_core::error::EdgeBenchError;
use edgebench_core::filters::sobel::SoftwareMode;
use edgebench_core::quality::MseDivisor;

#[test]
fn test_default_config() {
    let config = BenchmarkConfig::default();
    assert_eq!(config.side, 1024);
    assert_eq!(config.input, PathBuf::from("input.grey"));
    assert_eq!(config.golden, PathBuf::from("golden.grey"));
    assert_eq!(config.output, PathBuf::from("output_sobel.grey"));
    assert_eq!(config.memory.input_base, 0x0500_0000);
    assert_eq!(config.memory.output_base, 0x0700_0000);
    assert_eq!(config.psnr.peak_squared, 65536.0);
    assert_eq!(config.psnr.divisor, MseDivisor::FullFrame);
    assert!(matches!(config.device, DeviceKind::Uio { ref name, .. } if name == "sobel"));
    config.validate().unwrap();
}

#[test]
fn test_default_config_toml_roundtrip() {
    let config = BenchmarkConfig::default();
    let text = config.to_toml_string().unwrap();
    let back = BenchmarkConfig::from_toml_str(&text).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let text = r#"
input = "frames/in.grey"
golden = "frames/golden.grey"
output = "frames/out.grey"
side = 256

[device]
kind = "Emulated"
mode = "Parallel"

[wait]
timeout_ms = 500
"#;
    let config = BenchmarkConfig::from_toml_str(text).unwrap();
    assert_eq!(config.side, 256);
    assert_eq!(
        config.device,
        DeviceKind::Emulated {
            mode: SoftwareMode::Parallel
        }
    );
    assert_eq!(config.wait.timeout_ms, 500);
    assert_eq!(config.wait.poll_interval_us, 0);
    assert_eq!(config.memory.input_base, 0x0500_0000);
    assert!(config.png.is_none());

    let options = config.benchmark_options();
    assert_eq!(options.wait.timeout_ms, 500);
    assert!(options.cancel.is_none());
}

#[test]
fn test_uio_device_offsets() {
    let text = r#"
input = "a.grey"
golden = "b.grey"
output = "c.grey"

[device]
kind = "Uio"
name = "edge_filter"
input_pointer_offset = 32
"#;
    let config = BenchmarkConfig::from_toml_str(text).unwrap();
    assert_eq!(
        config.device,
        DeviceKind::Uio {
            name: "edge_filter".into(),
            input_pointer_offset: 32,
            output_pointer_offset: 0x18,
        }
    );
}

#[test]
fn test_rejects_small_side() {
    let config = BenchmarkConfig {
        side: 2,
        ..BenchmarkConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(EdgeBenchError::InvalidDimensions { side: 2 })
    ));
}

#[test]
fn test_rejects_overlapping_frames() {
    let mut config = BenchmarkConfig::default();
    config.memory.output_base = config.memory.input_base + 1024;
    assert!(matches!(config.validate(), Err(EdgeBenchError::Config(_))));

    // Adjacent frames are fine.
    config.memory.output_base = config.memory.input_base + (1024 * 1024);
    config.validate().unwrap();
}

#[test]
fn test_rejects_zero_timeout() {
    let mut config = BenchmarkConfig::default();
    config.wait.timeout_ms = 0;
    assert!(matches!(config.validate(), Err(EdgeBenchError::Config(_))));
}

#[test]
fn test_rejects_bad_peak() {
    let mut config = BenchmarkConfig::default();
    config.psnr.peak_squared = 0.0;
    assert!(matches!(config.validate(), Err(EdgeBenchError::Config(_))));
}

#[test]
fn test_malformed_toml() {
    assert!(matches!(
        BenchmarkConfig::from_toml_str("side = \"big\""),
        Err(EdgeBenchError::Config(_))
    ));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        BenchmarkConfig::load(&dir.path().join("bench.toml")),
        Err(EdgeBenchError::MissingInput { .. })
    ));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.toml");
    let mut config = BenchmarkConfig::default();
    config.png = Some(PathBuf::from("edges.png"));
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
    assert_eq!(BenchmarkConfig::load(&path).unwrap(), config);
}

fn config_with(extra: &str) -> String {
    format!("input = \"a.grey\"\ngolden = \"b.grey\"\noutput = \"c.grey\"\n{extra}")
}

#[test]
fn test_output_base_at_address_limit_is_rejected() {
    let text = config_with("[memory]\noutput_base = 18446744073709551615\n");
    assert!(matches!(
        BenchmarkConfig::from_toml_str(&text),
        Err(EdgeBenchError::Config(_))
    ));

    let mut config = BenchmarkConfig::default();
    config.memory.output_base = u64::MAX;
    assert!(matches!(config.validate(), Err(EdgeBenchError::Config(_))));
}

#[test]
fn test_input_base_wrapping_is_rejected() {
    let mut config = BenchmarkConfig::default();
    config.memory.input_base = u64::MAX - 10;
    assert!(matches!(config.validate(), Err(EdgeBenchError::Config(_))));
}

#[test]
fn test_huge_side_is_rejected() {
    let text = config_with("side = 9223372036854775807\n");
    assert!(matches!(
        BenchmarkConfig::from_toml_str(&text),
        Err(EdgeBenchError::InvalidDimensions { .. })
    ));
}

#[test]
fn test_rejects_peak_below_8bit_range() {
    let mut config = BenchmarkConfig::default();
    config.psnr.peak_squared = 100.0;
    assert!(matches!(config.validate(), Err(EdgeBenchError::Config(_))));

    config.psnr.peak_squared = 65025.0;
    config.validate().unwrap();
}
