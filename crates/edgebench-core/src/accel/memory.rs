//! Device-visible memory: `/dev/mem` windows and an in-process emulated bus.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use memmap2::{MmapMut, MmapOptions};
use tracing::debug;

use crate::error::{EdgeBenchError, Result};

/// A byte region the accelerator reads or writes by physical address.
pub trait DeviceBuffer: Send {
    /// Physical (bus) address of the first byte.
    fn address(&self) -> u64;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the whole region into `dst` (which must be `len()` bytes).
    fn read_into(&self, dst: &mut [u8]) -> Result<()>;

    /// Overwrite the whole region with `src` (which must be `len()` bytes).
    fn write_from(&mut self, src: &[u8]) -> Result<()>;

    fn fill(&mut self, value: u8) -> Result<()>;
}

/// Maps physical address ranges into the process.
pub trait PhysicalMemory {
    fn map_region(&self, base: u64, len: usize) -> Result<Box<dyn DeviceBuffer>>;
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(EdgeBenchError::Device(format!(
            "buffer length mismatch: region is {expected} bytes, slice is {actual}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// /dev/mem
// ---------------------------------------------------------------------------

pub const DEV_MEM_PATH: &str = "/dev/mem";

/// Physical memory through `/dev/mem`, opened uncached (`O_SYNC`).
pub struct DevMem {
    file: File,
}

impl DevMem {
    pub fn open() -> Result<Self> {
        Self::open_path(Path::new(DEV_MEM_PATH))
    }

    pub fn open_path(path: &Path) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.read(true).write(true);
        #[cfg(target_os = "linux")]
        {
            use std::os::unix::fs::OpenOptionsExt;
            // O_SYNC on the generic Linux ABI (x86, arm, aarch64).
            options.custom_flags(0o4010000);
        }
        let file = options.open(path).map_err(|e| {
            EdgeBenchError::DeviceInit(format!("cannot open {}: {e}", path.display()))
        })?;
        Ok(Self { file })
    }
}

impl PhysicalMemory for DevMem {
    fn map_region(&self, base: u64, len: usize) -> Result<Box<dyn DeviceBuffer>> {
        // SAFETY: the region is device memory owned by the accelerator
        // design; nothing else in this process maps it.
        let map = unsafe { MmapOptions::new().offset(base).len(len).map_mut(&self.file) }
            .map_err(|e| {
                EdgeBenchError::DeviceInit(format!("cannot map {len} bytes at {base:#x}: {e}"))
            })?;
        debug!(base = %format!("{base:#x}"), len, "Mapped physical region");
        Ok(Box::new(MappedBuffer { base, map }))
    }
}

struct MappedBuffer {
    base: u64,
    map: MmapMut,
}

impl DeviceBuffer for MappedBuffer {
    fn address(&self) -> u64 {
        self.base
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn read_into(&self, dst: &mut [u8]) -> Result<()> {
        check_len(self.map.len(), dst.len())?;
        dst.copy_from_slice(&self.map);
        Ok(())
    }

    fn write_from(&mut self, src: &[u8]) -> Result<()> {
        check_len(self.map.len(), src.len())?;
        self.map.copy_from_slice(src);
        Ok(())
    }

    fn fill(&mut self, value: u8) -> Result<()> {
        self.map.fill(value);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Emulated bus
// ---------------------------------------------------------------------------

/// In-process stand-in for physical memory.
///
/// Regions are keyed by base address and shared between the host-side
/// [`DeviceBuffer`]s and emulated accelerators, which resolve the
/// addresses they were programmed with through [`read_region`] and
/// [`write_region`].
///
/// [`read_region`]: EmulatedMemory::read_region
/// [`write_region`]: EmulatedMemory::write_region
#[derive(Clone, Default)]
pub struct EmulatedMemory {
    regions: Arc<Mutex<BTreeMap<u64, Vec<u8>>>>,
}

impl EmulatedMemory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<u64, Vec<u8>>>> {
        self.regions
            .lock()
            .map_err(|_| EdgeBenchError::Device("emulated memory lock poisoned".into()))
    }

    /// Copy `len` bytes starting at `address` out of a mapped region.
    pub fn read_region(&self, address: u64, len: usize) -> Result<Vec<u8>> {
        let regions = self.lock()?;
        let (slice_start, region) = locate(&regions, address, len)?;
        Ok(region[slice_start..slice_start + len].to_vec())
    }

    /// Write `bytes` starting at `address` into a mapped region.
    pub fn write_region(&self, address: u64, bytes: &[u8]) -> Result<()> {
        let mut regions = self.lock()?;
        let (slice_start, base) = {
            let (start, _) = locate(&regions, address, bytes.len())?;
            (start, address - start as u64)
        };
        let region = regions
            .get_mut(&base)
            .ok_or_else(|| unmapped(address, bytes.len()))?;
        region[slice_start..slice_start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

fn unmapped(address: u64, len: usize) -> EdgeBenchError {
    EdgeBenchError::Device(format!(
        "access of {len} bytes at {address:#x} hits unmapped emulated memory"
    ))
}

/// Find the region containing `[address, address + len)`; returns the
/// offset into that region.
fn locate(regions: &BTreeMap<u64, Vec<u8>>, address: u64, len: usize) -> Result<(usize, &Vec<u8>)> {
    let (&base, region) = regions
        .range(..=address)
        .next_back()
        .ok_or_else(|| unmapped(address, len))?;
    let start = (address - base) as usize;
    if start.checked_add(len).map_or(true, |end| end > region.len()) {
        return Err(unmapped(address, len));
    }
    Ok((start, region))
}

impl PhysicalMemory for EmulatedMemory {
    fn map_region(&self, base: u64, len: usize) -> Result<Box<dyn DeviceBuffer>> {
        let mut regions = self.lock()?;
        let end = base.checked_add(len as u64).ok_or_else(|| {
            EdgeBenchError::DeviceInit(format!(
                "emulated region of {len} bytes at {base:#x} wraps the address space"
            ))
        })?;
        let overlaps = regions
            .iter()
            .any(|(&b, r)| b != base && b < end && base < b.saturating_add(r.len() as u64));
        if overlaps {
            return Err(EdgeBenchError::DeviceInit(format!(
                "emulated region {base:#x}..{end:#x} overlaps an existing mapping"
            )));
        }
        regions.entry(base).or_insert_with(|| vec![0u8; len]).resize(len, 0);
        Ok(Box::new(EmulatedBuffer {
            memory: self.clone(),
            base,
            len,
        }))
    }
}

struct EmulatedBuffer {
    memory: EmulatedMemory,
    base: u64,
    len: usize,
}

impl DeviceBuffer for EmulatedBuffer {
    fn address(&self) -> u64 {
        self.base
    }

    fn len(&self) -> usize {
        self.len
    }

    fn read_into(&self, dst: &mut [u8]) -> Result<()> {
        check_len(self.len, dst.len())?;
        let bytes = self.memory.read_region(self.base, self.len)?;
        dst.copy_from_slice(&bytes);
        Ok(())
    }

    fn write_from(&mut self, src: &[u8]) -> Result<()> {
        check_len(self.len, src.len())?;
        self.memory.write_region(self.base, src)
    }

    fn fill(&mut self, value: u8) -> Result<()> {
        self.memory.write_region(self.base, &vec![value; self.len])
    }
}
