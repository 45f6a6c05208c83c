use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use edgebench_core::bench::measure;
use edgebench_core::consts::DEFAULT_IMAGE_SIDE;
use edgebench_core::filters::sobel::{sobel_with_mode, SoftwareMode};
use edgebench_core::frame::GreyImage;
use edgebench_core::io::{load_image, load_raw, save_png, save_raw};

#[derive(Args)]
pub struct SobelArgs {
    /// Input image (raw .grey, or PNG/TIFF)
    pub file: PathBuf,

    /// Side length of a raw input
    #[arg(long, default_value_t = DEFAULT_IMAGE_SIDE)]
    pub side: usize,

    /// Run on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Output file path (.png renders an image, anything else is raw)
    #[arg(short, long, default_value = "output_sobel.grey")]
    pub output: PathBuf,
}

fn is_raster(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("png" | "tif" | "tiff" | "bmp" | "jpg" | "jpeg")
    )
}

fn load_any(path: &Path, side: usize) -> Result<GreyImage> {
    let frame = if is_raster(path) {
        load_image(path)?
    } else {
        load_raw(path, side)?
    };
    Ok(frame)
}

pub fn run(args: &SobelArgs) -> Result<()> {
    let input = load_any(&args.file, args.side)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    println!("Loaded {0}x{0} image", input.side());

    let mode = if args.parallel {
        SoftwareMode::Parallel
    } else {
        SoftwareMode::Sequential
    };
    let (output, timing) = measure(|| sobel_with_mode(&input, mode));
    println!(
        "Sobel ({}) took {:.6} seconds",
        mode,
        timing.elapsed_secs()
    );

    if args.output.extension().and_then(|e| e.to_str()) == Some("png") {
        save_png(&output, &args.output)?;
    } else {
        save_raw(&output, &args.output)?;
    }
    println!("Saved to {}", args.output.display());

    Ok(())
}
