//! Compute backends for batched neural evaluation.
//!
//! A backend receives a [`PackedBatch`] (every controller's parameters,
//! memory and inputs laid end to end) and returns outputs plus the new
//! memory vectors. [`CpuBackend`] is the reference; the `gpu` feature adds
//! a wgpu implementation with the same layout and clamp ranges.

use crate::batch::PackedBatch;
use digilife_agents::neural::{relu, sigmoid, tanh, NetworkShape};
use rayon::prelude::*;

/// Errors raised by a compute backend.
///
/// These never reach the world: the batch evaluator logs them and falls
/// back to per-creature CPU evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("GPU device request failed: {0}")]
    Device(String),

    #[error("GPU support is not compiled in")]
    Unavailable,

    #[error("batch mixes network shapes")]
    ShapeMismatch,

    #[error("buffer read-back failed: {0}")]
    ReadBack(String),

    #[error("backend returned {actual} values, expected {expected}")]
    OutputLength { expected: usize, actual: usize },

    #[error("{0}")]
    Other(String),
}

/// Result of evaluating a packed batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    /// `count * outputs` values, creature-major.
    pub outputs: Vec<f32>,
    /// `count * hidden2` values, the new memory of every controller.
    pub memory: Vec<f32>,
}

/// A data-parallel evaluator for packed controller batches.
pub trait ComputeBackend: Send {
    fn name(&self) -> &'static str;

    fn evaluate(&mut self, batch: &PackedBatch) -> Result<BatchOutput, BackendError>;
}

/// Offsets of each tensor inside one controller's parameter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterLayout {
    pub b1: usize,
    pub w2: usize,
    pub b2: usize,
    pub w3: usize,
    pub b3: usize,
    pub len: usize,
}

impl ParameterLayout {
    pub fn of(shape: NetworkShape) -> Self {
        let b1 = shape.inputs * shape.hidden1;
        let w2 = b1 + shape.hidden1;
        let b2 = w2 + shape.hidden1 * shape.hidden2;
        let w3 = b2 + shape.hidden2;
        let b3 = w3 + shape.hidden2 * shape.outputs;
        Self {
            b1,
            w2,
            b2,
            w3,
            b3,
            len: b3 + shape.outputs,
        }
    }
}

/// One forward pass over a packed parameter block.
///
/// Accumulates in the same order as `NeuralController::forward`, so the two
/// agree to the last bit on the same platform.
pub fn forward_packed(
    shape: NetworkShape,
    params: &[f32],
    decay: f32,
    inputs: &[f32],
    memory: &[f32],
) -> (Vec<f32>, Vec<f32>) {
    let l = ParameterLayout::of(shape);

    let mut h1 = params[l.b1..l.b1 + shape.hidden1].to_vec();
    for (i, &x) in inputs.iter().take(shape.inputs).enumerate() {
        let row = &params[i * shape.hidden1..(i + 1) * shape.hidden1];
        for (acc, w) in h1.iter_mut().zip(row) {
            *acc += x * w;
        }
    }
    h1.iter_mut().for_each(|v| *v = relu(*v));

    let mut h2 = params[l.b2..l.b2 + shape.hidden2].to_vec();
    for (i, &x) in h1.iter().enumerate() {
        let start = l.w2 + i * shape.hidden2;
        for (acc, w) in h2.iter_mut().zip(&params[start..start + shape.hidden2]) {
            *acc += x * w;
        }
    }
    for (v, m) in h2.iter_mut().zip(memory) {
        *v = tanh(*v + m * decay);
    }

    let mut out = params[l.b3..l.b3 + shape.outputs].to_vec();
    for (i, &x) in h2.iter().enumerate() {
        let start = l.w3 + i * shape.outputs;
        for (acc, w) in out.iter_mut().zip(&params[start..start + shape.outputs]) {
            *acc += x * w;
        }
    }
    out.iter_mut().for_each(|v| *v = sigmoid(*v));

    (out, h2)
}

/// Reference backend: one rayon task per controller.
#[derive(Debug, Default)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn evaluate(&mut self, batch: &PackedBatch) -> Result<BatchOutput, BackendError> {
        let shape = batch.shape;
        let plen = ParameterLayout::of(shape).len;

        let results: Vec<(Vec<f32>, Vec<f32>)> = (0..batch.count)
            .into_par_iter()
            .map(|a| {
                forward_packed(
                    shape,
                    &batch.params[a * plen..(a + 1) * plen],
                    batch.decays[a],
                    &batch.inputs[a * shape.inputs..(a + 1) * shape.inputs],
                    &batch.memory[a * shape.hidden2..(a + 1) * shape.hidden2],
                )
            })
            .collect();

        let mut output = BatchOutput {
            outputs: Vec::with_capacity(batch.count * shape.outputs),
            memory: Vec::with_capacity(batch.count * shape.hidden2),
        };
        for (out, mem) in results {
            output.outputs.extend(out);
            output.memory.extend(mem);
        }
        Ok(output)
    }
}

/// Pick the backend once at startup.
///
/// Asks for the GPU when `prefer_gpu` is set and the crate was built with
/// the `gpu` feature; anything else ends up on the CPU.
pub fn probe_backend(prefer_gpu: bool) -> Box<dyn ComputeBackend> {
    if prefer_gpu {
        #[cfg(feature = "gpu")]
        {
            match crate::gpu::GpuBackend::new() {
                Ok(gpu) => {
                    tracing::info!(adapter = %gpu.adapter_name(), "using GPU compute backend");
                    return Box::new(gpu);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "GPU backend unavailable, using CPU");
                }
            }
        }
        #[cfg(not(feature = "gpu"))]
        {
            tracing::debug!(error = %BackendError::Unavailable, "using CPU compute backend");
        }
    }
    Box::new(CpuBackend::new())
}
