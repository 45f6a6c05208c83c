use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::accel::{DeviceKind, WaitPolicy};
use crate::bench::BenchmarkOptions;
use crate::consts::{
    DEFAULT_GOLDEN_FILE, DEFAULT_IMAGE_SIDE, DEFAULT_INPUT_BASE, DEFAULT_INPUT_FILE,
    DEFAULT_OUTPUT_BASE, DEFAULT_OUTPUT_FILE,
};
use crate::error::{EdgeBenchError, Result};
use crate::filters::sobel::SoftwareMode;
use crate::frame::frame_len;
use crate::quality::PsnrConfig;

/// Full configuration of a benchmark run, stored as TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    pub input: PathBuf,
    pub golden: PathBuf,
    /// Raw software result written after the run.
    pub output: PathBuf,
    /// Optional PNG rendering of the software result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub png: Option<PathBuf>,
    #[serde(default = "default_side")]
    pub side: usize,
    #[serde(default)]
    pub software: SoftwareMode,
    #[serde(default)]
    pub device: DeviceKind,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub wait: WaitPolicy,
    #[serde(default)]
    pub psnr: PsnrConfig,
}

fn default_side() -> usize {
    DEFAULT_IMAGE_SIDE
}

/// End address of a frame, rejecting frames that wrap the address space.
fn frame_end(base: u64, len: u64, which: &str) -> Result<u64> {
    base.checked_add(len).ok_or_else(|| {
        EdgeBenchError::Config(format!(
            "{which} frame at {base:#x} runs past the end of the address space"
        ))
    })
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_FILE),
            golden: PathBuf::from(DEFAULT_GOLDEN_FILE),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            png: None,
            side: DEFAULT_IMAGE_SIDE,
            software: SoftwareMode::default(),
            device: DeviceKind::default(),
            memory: MemoryConfig::default(),
            wait: WaitPolicy::default(),
            psnr: PsnrConfig::default(),
        }
    }
}

/// Physical addresses of the accelerator's frame buffers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub input_base: u64,
    pub output_base: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            input_base: DEFAULT_INPUT_BASE,
            output_base: DEFAULT_OUTPUT_BASE,
        }
    }
}

impl BenchmarkConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| EdgeBenchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EdgeBenchError::MissingInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EdgeBenchError::Config(e.to_string()))
    }

    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        let len = frame_len(self.side)? as u64;
        let (a, b) = (self.memory.input_base, self.memory.output_base);
        let a_end = frame_end(a, len, "input")?;
        let b_end = frame_end(b, len, "output")?;
        if a < b_end && b < a_end {
            return Err(EdgeBenchError::Config(format!(
                "input frame at {a:#x} overlaps output frame at {b:#x}"
            )));
        }
        if self.wait.timeout_ms == 0 {
            return Err(EdgeBenchError::Config("wait.timeout_ms must be positive".into()));
        }
        self.psnr.validate()
    }

    /// Harness options derived from this configuration.
    pub fn benchmark_options(&self) -> BenchmarkOptions {
        BenchmarkOptions {
            software: self.software,
            wait: self.wait.clone(),
            psnr: self.psnr.clone(),
            cancel: None,
        }
    }
}
