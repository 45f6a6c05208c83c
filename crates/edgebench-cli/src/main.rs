mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edgebench", about = "Sobel accelerator validation and benchmark tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark software vs accelerator Sobel against a golden image
    Run(commands::run::RunArgs),
    /// Apply the software Sobel filter to an image
    Sobel(commands::sobel::SobelArgs),
    /// Compute PSNR between two raw images
    Psnr(commands::psnr::PsnrArgs),
    /// Print the accelerator handshake flags
    Status(commands::status::StatusArgs),
    /// Print or save the default benchmark config as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Sobel(args) => commands::sobel::run(args),
        Commands::Psnr(args) => commands::psnr::run(args),
        Commands::Status(args) => commands::status::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
