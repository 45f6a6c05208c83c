#![allow(dead_code)]

use edgebench_core::accel::{AcceleratorDriver, EmulatedMemory, HardwarePath};
use edgebench_core::frame::GreyImage;
use edgebench_core::error::Result;

pub const TEST_INPUT_BASE: u64 = 0x0500_0000;
pub const TEST_OUTPUT_BASE: u64 = 0x0700_0000;

/// Deterministic textured test image with edges in both directions.
pub fn textured_image(side: usize) -> GreyImage {
    GreyImage::from_fn(side, |(r, c)| {
        let checker = if (r / 4 + c / 4) % 2 == 0 { 40 } else { 200 };
        ((checker + r * 3 + c * 5) % 256) as u8
    })
    .expect("valid side")
}

/// Left columns 0, right columns 255; the step lies between `split - 1`
/// and `split`.
pub fn step_image(side: usize, split: usize) -> GreyImage {
    GreyImage::from_fn(side, |(_, c)| if c < split { 0 } else { 255 }).expect("valid side")
}

/// Hardware path over a fresh emulated bus with the given driver.
pub fn emulated_path(
    make_driver: impl FnOnce(EmulatedMemory) -> Box<dyn AcceleratorDriver>,
    side: usize,
) -> Result<HardwarePath> {
    let memory = EmulatedMemory::new();
    let driver = make_driver(memory.clone());
    HardwarePath::new(driver, &memory, TEST_INPUT_BASE, TEST_OUTPUT_BASE, side)
}

/// Driver whose done flag never rises.
pub struct StuckDriver {
    pub started: bool,
}

impl AcceleratorDriver for StuckDriver {
    fn name(&self) -> &str {
        "Stuck"
    }

    fn set_input_address(&mut self, _address: u64) -> Result<()> {
        Ok(())
    }

    fn set_output_address(&mut self, _address: u64) -> Result<()> {
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.started = true;
        Ok(())
    }

    fn is_done(&self) -> bool {
        false
    }

    fn is_idle(&self) -> bool {
        !self.started
    }

    fn is_ready(&self) -> bool {
        !self.started
    }
}

/// Write bytes to a temporary file that lives as long as the handle.
pub fn write_temp(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(data).expect("write data");
    f.flush().expect("flush");
    f
}
