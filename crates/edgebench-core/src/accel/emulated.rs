use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::error::{EdgeBenchError, Result};
use crate::filters::sobel::{sobel_with_mode, SoftwareMode};
use crate::frame::{frame_len, GreyImage};

use super::memory::EmulatedMemory;
use super::AcceleratorDriver;

/// Control state of a job running on a worker thread, mirroring the
/// ap_start / ap_done / ap_idle handshake of an HLS block.
#[derive(Default)]
pub(crate) struct JobState {
    busy: AtomicBool,
    done: AtomicBool,
    fault: Mutex<Option<String>>,
}

impl JobState {
    pub(crate) fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub(crate) fn take_fault(&self) -> Option<String> {
        self.fault.lock().ok().and_then(|mut f| f.take())
    }
}

/// Where a job reads and writes its frame.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct JobAddresses {
    pub input: Option<u64>,
    pub output: Option<u64>,
}

/// Raises `done` and clears `busy` when the worker exits, including by
/// panic, so a failed job never leaves the device stuck busy.
struct CompletionGuard(Arc<JobState>);

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            if let Ok(mut fault) = self.0.fault.lock() {
                fault.get_or_insert_with(|| "accelerator job panicked".into());
            }
        }
        self.0.busy.store(false, Ordering::Release);
        self.0.done.store(true, Ordering::Release);
    }
}

/// Spawn `compute` between two regions of `memory`.
///
/// `done` is raised after the output region is written, or after a
/// failure has been recorded as the job's fault.
pub(crate) fn spawn_job<F>(
    label: &'static str,
    memory: EmulatedMemory,
    addresses: JobAddresses,
    side: usize,
    state: Arc<JobState>,
    compute: F,
) -> Result<JoinHandle<()>>
where
    F: FnOnce(&GreyImage) -> Result<GreyImage> + Send + 'static,
{
    let (Some(input), Some(output)) = (addresses.input, addresses.output) else {
        return Err(EdgeBenchError::Device(
            "start issued before input/output pointers were set".into(),
        ));
    };
    if state.is_busy() {
        return Err(EdgeBenchError::Device("start issued while busy".into()));
    }
    let len = frame_len(side)?;

    state.done.store(false, Ordering::Release);
    state.busy.store(true, Ordering::Release);

    let worker_state = Arc::clone(&state);
    std::thread::Builder::new()
        .name(label.into())
        .spawn(move || {
            let guard = CompletionGuard(worker_state);
            let outcome = memory
                .read_region(input, len)
                .and_then(|bytes| GreyImage::from_raw(side, bytes))
                .and_then(|frame| compute(&frame))
                .and_then(|result| memory.write_region(output, result.as_bytes()));
            if let Err(e) = outcome {
                warn!(job = label, error = %e, "Accelerator job failed");
                if let Ok(mut fault) = guard.0.fault.lock() {
                    *fault = Some(e.to_string());
                }
            }
        })
        .map_err(|e| {
            state.busy.store(false, Ordering::Release);
            EdgeBenchError::Io(e)
        })
}

/// Accelerator stand-in that runs the software Sobel filter on a worker
/// thread against [`EmulatedMemory`].
pub struct EmulatedSobel {
    memory: EmulatedMemory,
    side: usize,
    mode: SoftwareMode,
    addresses: JobAddresses,
    state: Arc<JobState>,
    worker: Option<JoinHandle<()>>,
}

impl EmulatedSobel {
    pub fn new(memory: EmulatedMemory, side: usize, mode: SoftwareMode) -> Self {
        Self {
            memory,
            side,
            mode,
            addresses: JobAddresses::default(),
            state: Arc::new(JobState::default()),
            worker: None,
        }
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("Emulated accelerator worker panicked");
            }
        }
    }
}

impl AcceleratorDriver for EmulatedSobel {
    fn name(&self) -> &str {
        "Emulated"
    }

    fn set_input_address(&mut self, address: u64) -> Result<()> {
        self.addresses.input = Some(address);
        Ok(())
    }

    fn set_output_address(&mut self, address: u64) -> Result<()> {
        self.addresses.output = Some(address);
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if !self.state.is_busy() {
            self.join_worker();
        }
        let mode = self.mode;
        let handle = spawn_job(
            "emulated-sobel",
            self.memory.clone(),
            self.addresses,
            self.side,
            Arc::clone(&self.state),
            move |frame| Ok(sobel_with_mode(frame, mode)),
        )?;
        debug!(side = self.side, mode = %mode, "Emulated accelerator started");
        self.worker = Some(handle);
        Ok(())
    }

    fn is_done(&self) -> bool {
        self.state.is_done()
    }

    fn is_idle(&self) -> bool {
        !self.state.is_busy()
    }

    fn is_ready(&self) -> bool {
        !self.state.is_busy()
    }

    fn take_fault(&mut self) -> Option<EdgeBenchError> {
        self.state.take_fault().map(EdgeBenchError::Device)
    }

    fn release(&mut self) {
        self.join_worker();
    }
}
