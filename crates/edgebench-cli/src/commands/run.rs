use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use edgebench_core::accel::open_hardware;
use edgebench_core::bench::{run_benchmark, BenchmarkInputs};
use edgebench_core::config::BenchmarkConfig;
use edgebench_core::filters::sobel::SoftwareMode;
use edgebench_core::io::{load_raw, save_png, save_raw};
use edgebench_core::quality::MseDivisor;
use tracing::info;

use super::{apply_device_args, DeviceArg};
use crate::progress::SpinnerReporter;
use crate::summary::{print_benchmark_summary, print_run_header};

#[derive(Args)]
pub struct RunArgs {
    /// Benchmark config file (TOML); flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Raw input image
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Raw golden Sobel image
    #[arg(long)]
    pub golden: Option<PathBuf>,

    /// Raw software result output path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also render the software result as PNG
    #[arg(long)]
    pub png: Option<PathBuf>,

    /// Image side length in pixels
    #[arg(long)]
    pub side: Option<usize>,

    /// Accelerator implementation
    #[arg(long, value_enum)]
    pub device: Option<DeviceArg>,

    /// UIO device name of the Sobel core
    #[arg(long)]
    pub uio_name: Option<String>,

    /// Hardware completion timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Sleep between completion polls in microseconds (0 = spin)
    #[arg(long)]
    pub poll_interval_us: Option<u64>,

    /// Run the software path on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Divide the squared error by the interior pixel count instead of N^2
    #[arg(long)]
    pub interior_divisor: bool,

    /// Squared peak value for PSNR (default 65536)
    #[arg(long)]
    pub peak_squared: Option<f64>,

    /// Write the result figures to a TOML report
    #[arg(long)]
    pub report: Option<PathBuf>,
}

fn build_config(args: &RunArgs) -> Result<BenchmarkConfig> {
    let mut config = match args.config {
        Some(ref path) => BenchmarkConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => BenchmarkConfig::default(),
    };

    if let Some(ref p) = args.input {
        config.input = p.clone();
    }
    if let Some(ref p) = args.golden {
        config.golden = p.clone();
    }
    if let Some(ref p) = args.output {
        config.output = p.clone();
    }
    if args.png.is_some() {
        config.png = args.png.clone();
    }
    if let Some(side) = args.side {
        config.side = side;
    }
    apply_device_args(&mut config.device, args.device, args.uio_name.as_deref());
    if let Some(ms) = args.timeout_ms {
        config.wait.timeout_ms = ms;
    }
    if let Some(us) = args.poll_interval_us {
        config.wait.poll_interval_us = us;
    }
    if args.parallel {
        config.software = SoftwareMode::Parallel;
    }
    if args.interior_divisor {
        config.psnr.divisor = MseDivisor::Interior;
    }
    if let Some(peak) = args.peak_squared {
        config.psnr.peak_squared = peak;
    }

    config.validate().context("Invalid benchmark config")?;
    Ok(config)
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = build_config(args)?;
    print_run_header(&config);

    let input = load_raw(&config.input, config.side)
        .with_context(|| format!("File {} not found", config.input.display()))?;
    let golden = load_raw(&config.golden, config.side)
        .with_context(|| format!("File {} not found", config.golden.display()))?;
    std::fs::File::create(&config.output)
        .with_context(|| format!("File {} could not be created", config.output.display()))?;
    let inputs = BenchmarkInputs::new(input, golden)?;

    let mut hardware = open_hardware(
        &config.device,
        config.memory.input_base,
        config.memory.output_base,
        config.side,
    )
    .context("Accelerator initialization failed")?;
    println!("Accelerator status: {}", hardware.status());

    let reporter = SpinnerReporter::new()?;
    let outcome = run_benchmark(
        &inputs,
        &mut hardware,
        &config.benchmark_options(),
        &reporter,
    )?;
    reporter.finish();

    save_raw(&outcome.software_output, &config.output)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;
    if let Some(ref png) = config.png {
        save_png(&outcome.software_output, png)
            .with_context(|| format!("Failed to write {}", png.display()))?;
    }

    print_benchmark_summary(&outcome.result, &config);

    if let Some(ref path) = args.report {
        let report = toml::to_string_pretty(&outcome.result)?;
        std::fs::write(path, report)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "Report written");
    }

    Ok(())
}
