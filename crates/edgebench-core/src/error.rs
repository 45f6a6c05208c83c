use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdgeBenchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Required input {} could not be read: {source}", path.display())]
    MissingInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} holds {actual} bytes, expected {expected}", path.display())]
    SizeMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid image side {side} (must be at least 3, with side^2 addressable)")]
    InvalidDimensions { side: usize },

    #[error("Image sides differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Accelerator initialization failed: {0}")]
    DeviceInit(String),

    #[error("Accelerator did not report completion within {waited:?}")]
    DeviceTimeout { waited: Duration },

    #[error("Wait for accelerator cancelled")]
    Cancelled,

    #[error("Accelerator error: {0}")]
    Device(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("GPU error: {0}")]
    GpuError(String),
}

pub type Result<T> = std::result::Result<T, EdgeBenchError>;
