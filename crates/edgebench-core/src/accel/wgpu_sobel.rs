//! wgpu compute-shader Sobel accelerator (Metal / Vulkan / DX12).

use std::sync::Arc;
use std::thread::JoinHandle;

use bytemuck::{Pod, Zeroable};
use tracing::{debug, info, warn};
use wgpu::util::DeviceExt;

use crate::error::{EdgeBenchError, Result};
use crate::frame::GreyImage;

use super::emulated::{spawn_job, JobAddresses, JobState};
use super::memory::EmulatedMemory;
use super::AcceleratorDriver;

/// One invocation per pixel; samples are widened to u32 on upload.
const SOBEL_WGSL: &str = r"
struct Params { side: u32, _pad0: u32, _pad1: u32, _pad2: u32 }
@group(0) @binding(0) var<storage, read>       input:  array<u32>;
@group(0) @binding(1) var<storage, read_write> output: array<u32>;
@group(0) @binding(2) var<uniform>             params: Params;

fn px(idx: u32) -> i32 { return i32(input[idx]); }

@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    let n = params.side;
    let row = gid.y; let col = gid.x;
    if row >= n || col >= n { return; }
    let idx = row * n + col;
    if row == 0u || col == 0u || row == n - 1u || col == n - 1u {
        output[idx] = 0u;
        return;
    }
    let tl = px(idx - n - 1u); let tm = px(idx - n); let tr = px(idx - n + 1u);
    let ml = px(idx - 1u);                           let mr = px(idx + 1u);
    let bl = px(idx + n - 1u); let bm = px(idx + n); let br = px(idx + n + 1u);
    let gx = (tr + 2 * mr + br) - (tl + 2 * ml + bl);
    let gy = (tl + 2 * tm + tr) - (bl + 2 * bm + br);
    let magnitude = sqrt(f32(gx * gx + gy * gy));
    output[idx] = min(u32(magnitude), 255u);
}
";

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SobelParams {
    side: u32,
    _pad: [u32; 3],
}

const fn div_ceil(a: u32, b: u32) -> u32 {
    (a + b - 1) / b
}

struct GpuKernel {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
}

impl GpuKernel {
    fn new() -> std::result::Result<(Self, String), String> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| format!("No suitable GPU adapter found: {e}"))?;

        let adapter_name = adapter.get_info().name.clone();

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("edgebench"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
        ))
        .map_err(|e| format!("Failed to create GPU device: {e}"))?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sobel"),
            source: wgpu::ShaderSource::Wgsl(SOBEL_WGSL.into()),
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("sobel"),
            layout: None,
            module: &module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Ok((
            Self {
                device,
                queue,
                pipeline,
            },
            adapter_name,
        ))
    }

    fn run(&self, frame: &GreyImage) -> Result<GreyImage> {
        let side = frame.side();
        let widened: Vec<u32> = frame.as_bytes().iter().map(|&v| v as u32).collect();
        let byte_size = (widened.len() * std::mem::size_of::<u32>()) as u64;

        let input = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: None,
                contents: bytemuck::cast_slice(&widened),
                usage: wgpu::BufferUsages::STORAGE,
            });
        let output = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size: byte_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let uniform = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: None,
                contents: bytemuck::bytes_of(&SobelParams {
                    side: side as u32,
                    _pad: [0; 3],
                }),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size: byte_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = self.pipeline.get_bind_group_layout(0);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: input.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform.as_entire_binding(),
                },
            ],
        });

        let groups = div_ceil(side as u32, 16);
        let mut enc = self.device.create_command_encoder(&Default::default());
        {
            let mut pass = enc.begin_compute_pass(&Default::default());
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups, groups, 1);
        }
        enc.copy_buffer_to_buffer(&output, 0, &staging, 0, byte_size);
        self.queue.submit(std::iter::once(enc.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        slice.map_async(wgpu::MapMode::Read, move |r| {
            tx.send(r).ok();
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| EdgeBenchError::GpuError(format!("device poll failed: {e}")))?;
        rx.recv()
            .map_err(|_| EdgeBenchError::GpuError("GPU channel closed".into()))?
            .map_err(|e| EdgeBenchError::GpuError(format!("buffer mapping failed: {e}")))?;

        let data = slice.get_mapped_range();
        let samples: Vec<u8> = bytemuck::cast_slice::<u8, u32>(&data)
            .iter()
            .map(|&v| v.min(255) as u8)
            .collect();
        drop(data);
        staging.unmap();

        GreyImage::from_raw(side, samples)
    }
}

/// Sobel on the GPU, driven through the same start / done handshake as
/// the FPGA block. Frames live in [`EmulatedMemory`].
pub struct WgpuSobel {
    adapter_name: String,
    kernel: Arc<GpuKernel>,
    memory: EmulatedMemory,
    side: usize,
    addresses: JobAddresses,
    state: Arc<JobState>,
    worker: Option<JoinHandle<()>>,
}

impl WgpuSobel {
    pub fn new(memory: EmulatedMemory, side: usize) -> Result<Self> {
        let (kernel, adapter_name) = GpuKernel::new().map_err(EdgeBenchError::DeviceInit)?;
        info!(adapter = %adapter_name, "GPU Sobel kernel compiled");
        Ok(Self {
            adapter_name,
            kernel: Arc::new(kernel),
            memory,
            side,
            addresses: JobAddresses::default(),
            state: Arc::new(JobState::default()),
            worker: None,
        })
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("GPU accelerator worker panicked");
            }
        }
    }
}

impl AcceleratorDriver for WgpuSobel {
    fn name(&self) -> &str {
        "GPU/wgpu"
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
        let kernel = Arc::clone(&self.kernel);
        let handle = spawn_job(
            "wgpu-sobel",
            self.memory.clone(),
            self.addresses,
            self.side,
            Arc::clone(&self.state),
            move |frame| kernel.run(frame),
        )?;
        debug!(side = self.side, "GPU accelerator started");
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
        self.state.take_fault().map(EdgeBenchError::GpuError)
    }

    fn release(&mut self) {
        self.join_worker();
    }
}
