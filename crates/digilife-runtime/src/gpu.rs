//! wgpu compute backend.
//!
//! Three compute entry points run back to back over a packed batch: the
//! first hidden layer, the memory layer and the output layer. Each
//! invocation computes one unit of one controller. Clamp ranges match the
//! CPU activations.

use crate::backend::{BackendError, BatchOutput, ComputeBackend, ParameterLayout};
use crate::batch::PackedBatch;
use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;
use std::sync::mpsc;
use wgpu::util::DeviceExt;

const WORKGROUP_SIZE: u32 = 64;

const NEURAL_SHADER: &str = r#"
struct Dims {
    count: u32,
    inputs: u32,
    hidden1: u32,
    hidden2: u32,
    outputs: u32,
    param_len: u32,
    _pad0: u32,
    _pad1: u32,
}

@group(0) @binding(0) var<uniform> dims: Dims;
@group(0) @binding(1) var<storage, read> params: array<f32>;
@group(0) @binding(2) var<storage, read> decays: array<f32>;
@group(0) @binding(3) var<storage, read> inputs: array<f32>;
@group(0) @binding(4) var<storage, read_write> memory: array<f32>;
@group(0) @binding(5) var<storage, read_write> hidden1: array<f32>;
@group(0) @binding(6) var<storage, read_write> hidden2: array<f32>;
@group(0) @binding(7) var<storage, read_write> outputs: array<f32>;

const CLAMP: f32 = 10.0;

fn b1_offset() -> u32 { return dims.inputs * dims.hidden1; }
fn w2_offset() -> u32 { return b1_offset() + dims.hidden1; }
fn b2_offset() -> u32 { return w2_offset() + dims.hidden1 * dims.hidden2; }
fn w3_offset() -> u32 { return b2_offset() + dims.hidden2; }
fn b3_offset() -> u32 { return w3_offset() + dims.hidden2 * dims.outputs; }

@compute @workgroup_size(64)
fn hidden_layer(@builtin(global_invocation_id) id: vec3<u32>) {
    let idx = id.x;
    if (idx >= dims.count * dims.hidden1) { return; }
    let agent = idx / dims.hidden1;
    let unit = idx % dims.hidden1;
    let base = agent * dims.param_len;

    var acc = params[base + b1_offset() + unit];
    for (var i = 0u; i < dims.inputs; i = i + 1u) {
        acc = acc + inputs[agent * dims.inputs + i] * params[base + i * dims.hidden1 + unit];
    }
    hidden1[idx] = max(acc, 0.0);
}

@compute @workgroup_size(64)
fn memory_layer(@builtin(global_invocation_id) id: vec3<u32>) {
    let idx = id.x;
    if (idx >= dims.count * dims.hidden2) { return; }
    let agent = idx / dims.hidden2;
    let unit = idx % dims.hidden2;
    let base = agent * dims.param_len;

    var acc = params[base + b2_offset() + unit];
    for (var i = 0u; i < dims.hidden1; i = i + 1u) {
        acc = acc + hidden1[agent * dims.hidden1 + i] * params[base + w2_offset() + i * dims.hidden2 + unit];
    }
    let h = tanh(clamp(acc + memory[idx] * decays[agent], -CLAMP, CLAMP));
    hidden2[idx] = h;
    memory[idx] = h;
}

@compute @workgroup_size(64)
fn output_layer(@builtin(global_invocation_id) id: vec3<u32>) {
    let idx = id.x;
    if (idx >= dims.count * dims.outputs) { return; }
    let agent = idx / dims.outputs;
    let unit = idx % dims.outputs;
    let base = agent * dims.param_len;

    var acc = params[base + b3_offset() + unit];
    for (var i = 0u; i < dims.hidden2; i = i + 1u) {
        acc = acc + hidden2[agent * dims.hidden2 + i] * params[base + w3_offset() + i * dims.outputs + unit];
    }
    outputs[idx] = 1.0 / (1.0 + exp(-clamp(acc, -CLAMP, CLAMP)));
}
"#;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Dims {
    count: u32,
    inputs: u32,
    hidden1: u32,
    hidden2: u32,
    outputs: u32,
    param_len: u32,
    _pad0: u32,
    _pad1: u32,
}

pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    layout: wgpu::BindGroupLayout,
    hidden: wgpu::ComputePipeline,
    memory: wgpu::ComputePipeline,
    output: wgpu::ComputePipeline,
    adapter_name: String,
}

impl GpuBackend {
    pub fn new() -> Result<Self, BackendError> {
        pollster::block_on(Self::new_async())
    }

    async fn new_async() -> Result<Self, BackendError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(BackendError::NoAdapter)?;
        let adapter_name = adapter.get_info().name;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("digilife neural"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                },
                None,
            )
            .await
            .map_err(|e| BackendError::Device(e.to_string()))?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("neural shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(NEURAL_SHADER)),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("neural bindings"),
            entries: &[
                buffer_entry(0, wgpu::BufferBindingType::Uniform),
                buffer_entry(1, wgpu::BufferBindingType::Storage { read_only: true }),
                buffer_entry(2, wgpu::BufferBindingType::Storage { read_only: true }),
                buffer_entry(3, wgpu::BufferBindingType::Storage { read_only: true }),
                buffer_entry(4, wgpu::BufferBindingType::Storage { read_only: false }),
                buffer_entry(5, wgpu::BufferBindingType::Storage { read_only: false }),
                buffer_entry(6, wgpu::BufferBindingType::Storage { read_only: false }),
                buffer_entry(7, wgpu::BufferBindingType::Storage { read_only: false }),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("neural pipeline layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = |entry_point: &'static str| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(entry_point),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point,
                compilation_options: Default::default(),
            })
        };
        let hidden = pipeline("hidden_layer");
        let memory = pipeline("memory_layer");
        let output = pipeline("output_layer");

        Ok(Self {
            device,
            queue,
            layout,
            hidden,
            memory,
            output,
            adapter_name,
        })
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    fn storage(&self, label: &str, data: &[f32], extra: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(data),
            usage: wgpu::BufferUsages::STORAGE | extra,
        })
    }

    fn scratch(&self, label: &str, floats: usize, extra: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (floats.max(1) * std::mem::size_of::<f32>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | extra,
            mapped_at_creation: false,
        })
    }

    fn staging(&self, label: &str, floats: usize) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (floats.max(1) * std::mem::size_of::<f32>()) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        })
    }

    fn read_back(&self, buffer: &wgpu::Buffer, floats: usize) -> Result<Vec<f32>, BackendError> {
        let slice = buffer.slice(..(floats * std::mem::size_of::<f32>()) as u64);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| BackendError::ReadBack(e.to_string()))?
            .map_err(|e| BackendError::ReadBack(e.to_string()))?;

        let values = bytemuck::cast_slice::<u8, f32>(&slice.get_mapped_range()).to_vec();
        buffer.unmap();
        Ok(values)
    }
}

impl ComputeBackend for GpuBackend {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn evaluate(&mut self, batch: &PackedBatch) -> Result<BatchOutput, BackendError> {
        let shape = batch.shape;
        let count = batch.count;
        let dims = Dims {
            count: count as u32,
            inputs: shape.inputs as u32,
            hidden1: shape.hidden1 as u32,
            hidden2: shape.hidden2 as u32,
            outputs: shape.outputs as u32,
            param_len: ParameterLayout::of(shape).len as u32,
            _pad0: 0,
            _pad1: 0,
        };

        let dims_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("dims"),
            contents: bytemuck::bytes_of(&dims),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let params = self.storage("params", &batch.params, wgpu::BufferUsages::empty());
        let decays = self.storage("decays", &batch.decays, wgpu::BufferUsages::empty());
        let inputs = self.storage("inputs", &batch.inputs, wgpu::BufferUsages::empty());
        let memory = self.storage("memory", &batch.memory, wgpu::BufferUsages::COPY_SRC);
        let hidden1 = self.scratch("hidden1", count * shape.hidden1, wgpu::BufferUsages::empty());
        let hidden2 = self.scratch("hidden2", count * shape.hidden2, wgpu::BufferUsages::empty());
        let outputs = self.scratch("outputs", count * shape.outputs, wgpu::BufferUsages::COPY_SRC);
        let outputs_staging = self.staging("outputs staging", count * shape.outputs);
        let memory_staging = self.staging("memory staging", count * shape.hidden2);

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("neural batch"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: dims_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: params.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: decays.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: inputs.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 4, resource: memory.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 5, resource: hidden1.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 6, resource: hidden2.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 7, resource: outputs.as_entire_binding() },
            ],
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("neural batch"),
        });
        let stages = [
            (&self.hidden, count * shape.hidden1),
            (&self.memory, count * shape.hidden2),
            (&self.output, count * shape.outputs),
        ];
        for (pipeline, invocations) in stages {
            // One pass per layer so each stage sees the previous one's writes.
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups((invocations as u32).div_ceil(WORKGROUP_SIZE), 1, 1);
        }

        let output_bytes = (count * shape.outputs * std::mem::size_of::<f32>()) as u64;
        let memory_bytes = (count * shape.hidden2 * std::mem::size_of::<f32>()) as u64;
        encoder.copy_buffer_to_buffer(&outputs, 0, &outputs_staging, 0, output_bytes);
        encoder.copy_buffer_to_buffer(&memory, 0, &memory_staging, 0, memory_bytes);
        self.queue.submit(Some(encoder.finish()));

        Ok(BatchOutput {
            outputs: self.read_back(&outputs_staging, count * shape.outputs)?,
            memory: self.read_back(&memory_staging, count * shape.hidden2)?,
        })
    }
}

fn buffer_entry(binding: u32, ty: wgpu::BufferBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
