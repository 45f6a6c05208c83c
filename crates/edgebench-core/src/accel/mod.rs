//! Hardware path collaborators: the accelerator driver interface, device
//! memory, and the bounded completion wait.

pub mod emulated;
mod hardware;
pub mod memory;
pub mod uio;
pub mod wait;
#[cfg(feature = "gpu")]
pub mod wgpu_sobel;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::consts::{
    DEFAULT_IN_POINTER_OFFSET, DEFAULT_OUT_POINTER_OFFSET, DEFAULT_UIO_NAME,
};
use crate::error::{EdgeBenchError, Result};
use crate::filters::sobel::SoftwareMode;

pub use emulated::EmulatedSobel;
pub use hardware::HardwarePath;
pub use memory::{DevMem, DeviceBuffer, EmulatedMemory, PhysicalMemory};
pub use uio::{RegisterLayout, UioSobel};
pub use wait::{wait_for_completion, CancelToken, WaitPolicy};

/// Control interface of a Sobel accelerator.
///
/// Construction performs device initialisation and fails with
/// [`EdgeBenchError::DeviceInit`]; a handle that exists is ready to be
/// programmed. The handle is owned by a [`HardwarePath`] and passed by
/// reference, never stored globally.
pub trait AcceleratorDriver: Send {
    fn name(&self) -> &str;

    /// Program the bus address of the input frame.
    fn set_input_address(&mut self, address: u64) -> Result<()>;

    /// Program the bus address of the output frame.
    fn set_output_address(&mut self, address: u64) -> Result<()>;

    /// Trigger one computation on the pre-loaded input.
    fn start(&mut self) -> Result<()>;

    fn is_done(&self) -> bool;

    fn is_idle(&self) -> bool;

    fn is_ready(&self) -> bool;

    /// Snapshot of the three handshake flags.
    fn status(&self) -> AcceleratorStatus {
        AcceleratorStatus {
            done: self.is_done(),
            idle: self.is_idle(),
            ready: self.is_ready(),
        }
    }

    /// Error raised by the last job, if the device can report one.
    fn take_fault(&mut self) -> Option<EdgeBenchError> {
        None
    }

    /// Return the device to the system. Called once when the owning
    /// [`HardwarePath`] is dropped.
    fn release(&mut self) {}
}

/// Handshake flags of the accelerator control register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceleratorStatus {
    pub done: bool,
    pub idle: bool,
    pub ready: bool,
}

impl std::fmt::Display for AcceleratorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "isDone {}, isIdle {}, isReady {}",
            self.done as u8, self.idle as u8, self.ready as u8
        )
    }
}

/// Which accelerator implementation drives the hardware path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DeviceKind {
    /// HLS Sobel block exposed through Linux UIO, frames in `/dev/mem`.
    Uio {
        name: String,
        #[serde(default = "default_in_pointer_offset")]
        input_pointer_offset: usize,
        #[serde(default = "default_out_pointer_offset")]
        output_pointer_offset: usize,
    },
    /// Software filter on a worker thread over emulated memory.
    Emulated {
        #[serde(default)]
        mode: SoftwareMode,
    },
    /// wgpu compute shader (requires the `gpu` feature).
    Gpu,
}

fn default_in_pointer_offset() -> usize {
    DEFAULT_IN_POINTER_OFFSET
}

fn default_out_pointer_offset() -> usize {
    DEFAULT_OUT_POINTER_OFFSET
}

impl Default for DeviceKind {
    fn default() -> Self {
        Self::Uio {
            name: DEFAULT_UIO_NAME.into(),
            input_pointer_offset: DEFAULT_IN_POINTER_OFFSET,
            output_pointer_offset: DEFAULT_OUT_POINTER_OFFSET,
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uio { name, .. } => write!(f, "UIO ({name})"),
            Self::Emulated { mode } => write!(f, "Emulated ({mode})"),
            Self::Gpu => write!(f, "GPU (wgpu)"),
        }
    }
}

/// Initialise the selected accelerator and map its frame buffers.
///
/// Initialisation failures are fatal: an unusable device yields
/// [`EdgeBenchError::DeviceInit`] instead of a half-configured path.
pub fn open_hardware(
    device: &DeviceKind,
    input_base: u64,
    output_base: u64,
    side: usize,
) -> Result<HardwarePath> {
    let path = match device {
        DeviceKind::Uio {
            name,
            input_pointer_offset,
            output_pointer_offset,
        } => {
            let layout = RegisterLayout {
                input_pointer: *input_pointer_offset,
                output_pointer: *output_pointer_offset,
            };
            let driver = UioSobel::open(name, layout)?;
            let memory = DevMem::open()?;
            HardwarePath::new(Box::new(driver), &memory, input_base, output_base, side)?
        }
        DeviceKind::Emulated { mode } => {
            let memory = EmulatedMemory::new();
            let driver = EmulatedSobel::new(memory.clone(), side, *mode);
            HardwarePath::new(Box::new(driver), &memory, input_base, output_base, side)?
        }
        #[cfg(feature = "gpu")]
        DeviceKind::Gpu => {
            let memory = EmulatedMemory::new();
            let driver = wgpu_sobel::WgpuSobel::new(memory.clone(), side)?;
            HardwarePath::new(Box::new(driver), &memory, input_base, output_base, side)?
        }
        #[cfg(not(feature = "gpu"))]
        DeviceKind::Gpu => {
            return Err(EdgeBenchError::DeviceInit(
                "built without the `gpu` feature".into(),
            ));
        }
    };
    info!(device = %device, status = %path.status(), "Accelerator initialized");
    Ok(path)
}
