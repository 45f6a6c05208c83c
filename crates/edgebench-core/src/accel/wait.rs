use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::{DEFAULT_POLL_INTERVAL_US, DEFAULT_TIMEOUT_MS};
use crate::error::{EdgeBenchError, Result};

use super::AcceleratorDriver;

/// Bounds on the wait for the accelerator's done flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitPolicy {
    /// Give up after this many milliseconds.
    pub timeout_ms: u64,
    /// Sleep between polls; 0 busy-spins for the lowest completion latency.
    pub poll_interval_us: u64,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_us: DEFAULT_POLL_INTERVAL_US,
        }
    }
}

impl WaitPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us)
    }
}

/// Shared flag that aborts a pending [`wait_for_completion`].
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Poll `driver.is_done()` until it reports completion.
///
/// Returns the time spent waiting. Fails with
/// [`EdgeBenchError::DeviceTimeout`] once the policy's timeout elapses and
/// with [`EdgeBenchError::Cancelled`] when `cancel` is triggered.
pub fn wait_for_completion(
    driver: &dyn AcceleratorDriver,
    policy: &WaitPolicy,
    cancel: Option<&CancelToken>,
) -> Result<Duration> {
    let started = Instant::now();
    let timeout = policy.timeout();
    let interval = policy.poll_interval();
    let mut polls: u64 = 0;

    loop {
        if driver.is_done() {
            let waited = started.elapsed();
            debug!(polls, waited_us = waited.as_micros() as u64, "Accelerator done");
            return Ok(waited);
        }
        polls += 1;

        if cancel.is_some_and(CancelToken::is_cancelled) {
            warn!(polls, "Wait for accelerator cancelled");
            return Err(EdgeBenchError::Cancelled);
        }

        let waited = started.elapsed();
        if waited >= timeout {
            warn!(
                device = driver.name(),
                status = %driver.status(),
                timeout_ms = policy.timeout_ms,
                "Accelerator did not complete in time"
            );
            return Err(EdgeBenchError::DeviceTimeout { waited });
        }

        if interval.is_zero() {
            std::hint::spin_loop();
        } else {
            std::thread::sleep(interval);
        }
    }
}
