//! Register-level driver for the HLS Sobel block exposed through Linux UIO.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};
use tracing::{debug, info};

use crate::consts::{
    AP_AUTO_RESTART, AP_DONE, AP_IDLE, AP_START, DEFAULT_IN_POINTER_OFFSET,
    DEFAULT_OUT_POINTER_OFFSET, REG_AP_CTRL, REG_GIE, REG_IER,
};
use crate::error::{EdgeBenchError, Result};

use super::AcceleratorDriver;

pub const UIO_SYSFS_ROOT: &str = "/sys/class/uio";

/// Offsets of the pointer arguments in the AXI-Lite control window.
///
/// They depend on the HLS interface pragmas of the synthesised block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterLayout {
    pub input_pointer: usize,
    pub output_pointer: usize,
}

impl Default for RegisterLayout {
    fn default() -> Self {
        Self {
            input_pointer: DEFAULT_IN_POINTER_OFFSET,
            output_pointer: DEFAULT_OUT_POINTER_OFFSET,
        }
    }
}

/// A UIO device found in sysfs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UioDevice {
    /// Character device, e.g. `/dev/uio0`.
    pub device: PathBuf,
    /// Size of the first register map in bytes.
    pub map_size: usize,
}

/// Parse a sysfs size attribute such as `0x00010000`.
fn parse_sysfs_size(text: &str) -> Option<usize> {
    let text = text.trim();
    match text.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// Look up the UIO device whose `name` attribute equals `name`.
///
/// `sysfs_root` is normally [`UIO_SYSFS_ROOT`]; device nodes are assumed to
/// live in `/dev`.
pub fn find_uio_device(sysfs_root: &Path, name: &str) -> Result<Option<UioDevice>> {
    let entries = match fs::read_dir(sysfs_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    candidates.sort();

    for dir in candidates {
        let Ok(dev_name) = fs::read_to_string(dir.join("name")) else {
            continue;
        };
        if dev_name.trim() != name {
            continue;
        }
        let size_text = fs::read_to_string(dir.join("maps/map0/size"))?;
        let map_size = parse_sysfs_size(&size_text).ok_or_else(|| {
            EdgeBenchError::DeviceInit(format!(
                "unparsable map size {:?} in {}",
                size_text.trim(),
                dir.display()
            ))
        })?;
        let Some(node) = dir.file_name() else {
            continue;
        };
        return Ok(Some(UioDevice {
            device: Path::new("/dev").join(node),
            map_size,
        }));
    }
    Ok(None)
}

/// HLS-generated Sobel core driven through its AXI-Lite control registers.
pub struct UioSobel {
    name: String,
    regs: MmapMut,
    layout: RegisterLayout,
}

impl UioSobel {
    /// Find the named UIO device, map its registers and disable interrupts.
    pub fn open(name: &str, layout: RegisterLayout) -> Result<Self> {
        let device = find_uio_device(Path::new(UIO_SYSFS_ROOT), name)?.ok_or_else(|| {
            EdgeBenchError::DeviceInit(format!("no UIO device named {name:?}"))
        })?;
        Self::open_device(name, &device, layout)
    }

    pub fn open_device(name: &str, device: &UioDevice, layout: RegisterLayout) -> Result<Self> {
        let highest = layout.input_pointer.max(layout.output_pointer).max(REG_IER);
        if highest % 4 != 0 || highest + 4 > device.map_size {
            return Err(EdgeBenchError::DeviceInit(format!(
                "register layout {layout:?} does not fit a {}-byte control window",
                device.map_size
            )));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&device.device)
            .map_err(|e| {
                EdgeBenchError::DeviceInit(format!("cannot open {}: {e}", device.device.display()))
            })?;
        // SAFETY: UIO map 0 is the block's register window; this handle is
        // its only user for the lifetime of the driver.
        let regs = unsafe { MmapOptions::new().len(device.map_size).map_mut(&file) }.map_err(
            |e| EdgeBenchError::DeviceInit(format!("cannot map {}: {e}", device.device.display())),
        )?;

        let mut driver = Self {
            name: name.to_string(),
            regs,
            layout,
        };
        driver.disable_interrupts();
        info!(
            device = %device.device.display(),
            map_size = device.map_size,
            "UIO Sobel core initialized"
        );
        Ok(driver)
    }

    fn read_reg(&self, offset: usize) -> u32 {
        debug_assert!(offset + 4 <= self.regs.len());
        // SAFETY: offsets are validated against the window size at open and
        // are 4-byte aligned within a page-aligned mapping.
        unsafe { std::ptr::read_volatile(self.regs.as_ptr().add(offset) as *const u32) }
    }

    fn write_reg(&mut self, offset: usize, value: u32) {
        debug_assert!(offset + 4 <= self.regs.len());
        // SAFETY: see `read_reg`.
        unsafe { std::ptr::write_volatile(self.regs.as_mut_ptr().add(offset) as *mut u32, value) }
    }

    fn disable_interrupts(&mut self) {
        self.write_reg(REG_GIE, 0);
        let ier = self.read_reg(REG_IER);
        self.write_reg(REG_IER, ier & !0x1);
        debug!("Accelerator interrupts disabled");
    }

    fn write_pointer(&mut self, offset: usize, address: u64) -> Result<()> {
        let address = u32::try_from(address).map_err(|_| {
            EdgeBenchError::Device(format!("address {address:#x} exceeds the 32-bit pointer"))
        })?;
        self.write_reg(offset, address);
        Ok(())
    }
}

impl AcceleratorDriver for UioSobel {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_input_address(&mut self, address: u64) -> Result<()> {
        self.write_pointer(self.layout.input_pointer, address)
    }

    fn set_output_address(&mut self, address: u64) -> Result<()> {
        self.write_pointer(self.layout.output_pointer, address)
    }

    fn start(&mut self) -> Result<()> {
        let ctrl = self.read_reg(REG_AP_CTRL) & AP_AUTO_RESTART;
        self.write_reg(REG_AP_CTRL, ctrl | AP_START);
        Ok(())
    }

    fn is_done(&self) -> bool {
        self.read_reg(REG_AP_CTRL) & AP_DONE != 0
    }

    fn is_idle(&self) -> bool {
        self.read_reg(REG_AP_CTRL) & AP_IDLE != 0
    }

    fn is_ready(&self) -> bool {
        // ap_start self-clears once the block has accepted its input.
        self.read_reg(REG_AP_CTRL) & AP_START == 0
    }
}
