use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use edgebench_core::accel::open_hardware;
use edgebench_core::config::BenchmarkConfig;

use super::{apply_device_args, DeviceArg};

#[derive(Args)]
pub struct StatusArgs {
    /// Benchmark config file (TOML) naming the device
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Accelerator implementation
    #[arg(long, value_enum)]
    pub device: Option<DeviceArg>,

    /// UIO device name of the Sobel core
    #[arg(long)]
    pub uio_name: Option<String>,
}

pub fn run(args: &StatusArgs) -> Result<()> {
    let mut config = match args.config {
        Some(ref path) => BenchmarkConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => BenchmarkConfig::default(),
    };
    apply_device_args(&mut config.device, args.device, args.uio_name.as_deref());

    let hardware = open_hardware(
        &config.device,
        config.memory.input_base,
        config.memory.output_base,
        config.side,
    )
    .context("Accelerator initialization failed")?;

    println!("Device: {} ({})", hardware.name(), config.device);
    println!("Accelerator status: {}", hardware.status());

    Ok(())
}
