use tracing::{debug, info};

use crate::error::{EdgeBenchError, Result};
use crate::frame::{frame_len, GreyImage};

use super::memory::{DeviceBuffer, PhysicalMemory};
use super::wait::{wait_for_completion, CancelToken, WaitPolicy};
use super::{AcceleratorDriver, AcceleratorStatus};

/// An initialised accelerator together with its input and output frames.
///
/// Owns the device handle; the device is released when the path is
/// dropped.
pub struct HardwarePath {
    driver: Box<dyn AcceleratorDriver>,
    input: Box<dyn DeviceBuffer>,
    output: Box<dyn DeviceBuffer>,
    side: usize,
}

impl HardwarePath {
    /// Map both frames through `memory` and program their addresses.
    pub fn new(
        mut driver: Box<dyn AcceleratorDriver>,
        memory: &dyn PhysicalMemory,
        input_base: u64,
        output_base: u64,
        side: usize,
    ) -> Result<Self> {
        let len = frame_len(side)?;
        let input = memory.map_region(input_base, len)?;
        let output = memory.map_region(output_base, len)?;

        driver.set_input_address(input.address())?;
        driver.set_output_address(output.address())?;
        info!(
            device = driver.name(),
            input = %format!("{:#x}", input.address()),
            output = %format!("{:#x}", output.address()),
            "Accelerator frame pointers programmed"
        );

        Ok(Self {
            driver,
            input,
            output,
            side,
        })
    }

    pub fn name(&self) -> &str {
        self.driver.name()
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn status(&self) -> AcceleratorStatus {
        self.driver.status()
    }

    /// Copy `image` into the input frame and clear the output frame.
    pub fn load(&mut self, image: &GreyImage) -> Result<()> {
        if image.side() != self.side {
            return Err(EdgeBenchError::DimensionMismatch {
                left: image.side(),
                right: self.side,
            });
        }
        self.input.write_from(image.as_bytes())?;
        self.output.fill(0)?;
        debug!(bytes = image.len(), "Input frame loaded into device memory");
        Ok(())
    }

    /// Trigger the accelerator and block until it reports done, bounded by
    /// `policy`.
    pub fn run(&mut self, policy: &WaitPolicy, cancel: Option<&CancelToken>) -> Result<()> {
        self.driver.start()?;
        wait_for_completion(self.driver.as_ref(), policy, cancel)?;
        if let Some(fault) = self.driver.take_fault() {
            return Err(fault);
        }
        Ok(())
    }

    /// Copy the output frame out of device memory.
    pub fn read_output(&self) -> Result<GreyImage> {
        let mut bytes = vec![0u8; self.output.len()];
        self.output.read_into(&mut bytes)?;
        GreyImage::from_raw(self.side, bytes)
    }
}

impl Drop for HardwarePath {
    fn drop(&mut self) {
        self.driver.release();
        debug!(device = self.driver.name(), "Accelerator released");
    }
}
