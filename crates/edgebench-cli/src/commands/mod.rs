pub mod config;
pub mod psnr;
pub mod run;
pub mod sobel;
pub mod status;

use clap::ValueEnum;
use edgebench_core::accel::DeviceKind;
use edgebench_core::consts::{
    DEFAULT_IN_POINTER_OFFSET, DEFAULT_OUT_POINTER_OFFSET, DEFAULT_UIO_NAME,
};
use edgebench_core::filters::sobel::SoftwareMode;

#[derive(Clone, Copy, ValueEnum)]
pub enum DeviceArg {
    /// FPGA Sobel core through Linux UIO
    Uio,
    /// Software filter on a worker thread
    Emulated,
    /// wgpu compute shader (needs the `gpu` feature)
    Gpu,
}

impl DeviceArg {
    pub fn to_device_kind(self, uio_name: Option<&str>) -> DeviceKind {
        match self {
            Self::Uio => DeviceKind::Uio {
                name: uio_name.unwrap_or(DEFAULT_UIO_NAME).to_string(),
                input_pointer_offset: DEFAULT_IN_POINTER_OFFSET,
                output_pointer_offset: DEFAULT_OUT_POINTER_OFFSET,
            },
            Self::Emulated => DeviceKind::Emulated {
                mode: SoftwareMode::Sequential,
            },
            Self::Gpu => DeviceKind::Gpu,
        }
    }
}

/// Apply `--device` and `--uio-name` on top of the configured device.
///
/// A bare `--uio-name` renames the configured UIO device and leaves other
/// device kinds alone.
pub fn apply_device_args(device: &mut DeviceKind, arg: Option<DeviceArg>, uio_name: Option<&str>) {
    if let Some(arg) = arg {
        *device = arg.to_device_kind(uio_name);
    } else if let (Some(name), DeviceKind::Uio { name: current, .. }) = (uio_name, device) {
        *current = name.to_string();
    }
}
