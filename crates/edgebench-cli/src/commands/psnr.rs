use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use edgebench_core::consts::{DEFAULT_IMAGE_SIDE, PSNR_PEAK_SQUARED};
use edgebench_core::io::load_raw;
use edgebench_core::quality::psnr::mean_squared_error;
use edgebench_core::quality::{psnr, MseDivisor, PsnrConfig};

#[derive(Args)]
pub struct PsnrArgs {
    /// Raw image under test
    pub test: PathBuf,

    /// Raw golden image
    pub golden: PathBuf,

    /// Side length of both images
    #[arg(long, default_value_t = DEFAULT_IMAGE_SIDE)]
    pub side: usize,

    /// Divide the squared error by the interior pixel count instead of N^2
    #[arg(long)]
    pub interior_divisor: bool,

    /// Squared peak value
    #[arg(long, default_value_t = PSNR_PEAK_SQUARED)]
    pub peak_squared: f64,
}

pub fn run(args: &PsnrArgs) -> Result<()> {
    let test = load_raw(&args.test, args.side)
        .with_context(|| format!("File {} not found", args.test.display()))?;
    let golden = load_raw(&args.golden, args.side)
        .with_context(|| format!("File {} not found", args.golden.display()))?;

    let config = PsnrConfig {
        peak_squared: args.peak_squared,
        divisor: if args.interior_divisor {
            MseDivisor::Interior
        } else {
            MseDivisor::FullFrame
        },
    };

    let mse = mean_squared_error(&test, &golden, config.divisor)?;
    let score = psnr(&test, &golden, &config)?;

    println!("MSE  ({}): {:.6}", config.divisor, mse);
    println!("PSNR: {}", score);

    Ok(())
}
