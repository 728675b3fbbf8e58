//! Batched neural evaluation with CPU fallback.

use crate::backend::{BackendError, ComputeBackend, CpuBackend, ParameterLayout};
use digilife_agents::neural::{NetworkShape, NeuralController};

/// Many controllers flattened into contiguous buffers.
///
/// Each controller contributes one parameter block (`w1 b1 w2 b2 w3 b3`),
/// its memory decay, its memory and exactly `shape.inputs` inputs, padded
/// with zeros or truncated.
#[derive(Debug, Clone)]
pub struct PackedBatch {
    pub shape: NetworkShape,
    pub count: usize,
    pub params: Vec<f32>,
    pub decays: Vec<f32>,
    pub memory: Vec<f32>,
    pub inputs: Vec<f32>,
}

impl PackedBatch {
    pub fn pack(brains: &[&mut NeuralController], inputs: &[Vec<f32>]) -> Result<Self, BackendError> {
        let Some(first) = brains.first() else {
            return Err(BackendError::Other("empty batch".into()));
        };
        if inputs.len() != brains.len() {
            return Err(BackendError::OutputLength {
                expected: brains.len(),
                actual: inputs.len(),
            });
        }

        let shape = first.shape();
        let plen = ParameterLayout::of(shape).len;
        let count = brains.len();
        let mut batch = PackedBatch {
            shape,
            count,
            params: Vec::with_capacity(count * plen),
            decays: Vec::with_capacity(count),
            memory: Vec::with_capacity(count * shape.hidden2),
            inputs: Vec::with_capacity(count * shape.inputs),
        };

        for (brain, row) in brains.iter().zip(inputs) {
            if brain.shape() != shape {
                return Err(BackendError::ShapeMismatch);
            }
            let p = brain.parameters();
            for tensor in [p.w1, p.b1, p.w2, p.b2, p.w3, p.b3] {
                batch.params.extend_from_slice(tensor);
            }
            batch.decays.push(brain.memory_decay());
            batch.memory.extend_from_slice(p.memory);
            batch
                .inputs
                .extend((0..shape.inputs).map(|i| row.get(i).copied().unwrap_or(0.0)));
        }
        Ok(batch)
    }
}

/// Evaluates groups of controllers through a [`ComputeBackend`].
///
/// Any backend failure is logged and the whole group is re-run through
/// `NeuralController::forward`, one controller at a time. Callers always
/// get one output vector per controller.
pub struct BatchEvaluator {
    backend: Box<dyn ComputeBackend>,
    unreported: Option<BackendError>,
    failures: u64,
}

impl BatchEvaluator {
    pub fn new(backend: Box<dyn ComputeBackend>) -> Self {
        Self {
            backend,
            unreported: None,
            failures: 0,
        }
    }

    pub fn cpu() -> Self {
        Self::new(Box::new(CpuBackend::new()))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Number of batches that fell back to the CPU.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// The first backend failure, handed out once.
    pub fn take_fallback(&mut self) -> Option<BackendError> {
        self.unreported.take()
    }

    pub fn evaluate(&mut self, brains: &mut [&mut NeuralController], inputs: &[Vec<f32>]) -> Vec<Vec<f32>> {
        if brains.is_empty() {
            return Vec::new();
        }
        match self.try_backend(brains, inputs) {
            Ok(outputs) => outputs,
            Err(e) => {
                tracing::warn!(
                    backend = self.backend.name(),
                    batch = brains.len(),
                    error = %e,
                    "batch evaluation failed, falling back to CPU"
                );
                if self.failures == 0 {
                    self.unreported = Some(e);
                }
                self.failures += 1;
                brains
                    .iter_mut()
                    .enumerate()
                    .map(|(i, brain)| brain.forward(inputs.get(i).map_or(&[][..], |v| v.as_slice())))
                    .collect()
            }
        }
    }

    fn try_backend(
        &mut self,
        brains: &mut [&mut NeuralController],
        inputs: &[Vec<f32>],
    ) -> Result<Vec<Vec<f32>>, BackendError> {
        let packed = PackedBatch::pack(brains, inputs)?;
        let output = self.backend.evaluate(&packed)?;

        let shape = packed.shape;
        let expected = packed.count * shape.outputs;
        if output.outputs.len() != expected {
            return Err(BackendError::OutputLength {
                expected,
                actual: output.outputs.len(),
            });
        }
        let expected = packed.count * shape.hidden2;
        if output.memory.len() != expected {
            return Err(BackendError::OutputLength {
                expected,
                actual: output.memory.len(),
            });
        }

        for (brain, memory) in brains.iter_mut().zip(output.memory.chunks(shape.hidden2)) {
            brain.set_memory(memory);
        }
        Ok(output.outputs.chunks(shape.outputs).map(<[f32]>::to_vec).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BatchOutput;
    use digilife_core::types::SimRng;
    use rand::SeedableRng;

    struct Broken;

    impl ComputeBackend for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn evaluate(&mut self, _batch: &PackedBatch) -> Result<BatchOutput, BackendError> {
            Err(BackendError::Device("lost".into()))
        }
    }

    fn brains(n: usize, seed: u64) -> Vec<NeuralController> {
        let mut rng = SimRng::seed_from_u64(seed);
        (0..n)
            .map(|_| NeuralController::random(NetworkShape::default(), 0.7, &mut rng))
            .collect()
    }

    #[test]
    fn test_pack_pads_short_inputs() {
        let mut nets = brains(2, 1);
        let refs: Vec<&mut NeuralController> = nets.iter_mut().collect();
        let packed = PackedBatch::pack(&refs, &[vec![1.0, 2.0], vec![0.5; 12]]).unwrap();
        assert_eq!(packed.count, 2);
        assert_eq!(packed.inputs.len(), 16);
        assert_eq!(&packed.inputs[..3], &[1.0, 2.0, 0.0]);
        assert_eq!(packed.memory.len(), 16);
    }

    #[test]
    fn test_pack_rejects_mixed_shapes() {
        let mut rng = SimRng::seed_from_u64(2);
        let mut a = NeuralController::random(NetworkShape::default(), 0.7, &mut rng);
        let mut b = NeuralController::random(NetworkShape::new(8, 12, 4), 0.7, &mut rng);
        let refs = vec![&mut a, &mut b];
        let err = PackedBatch::pack(&refs, &[vec![0.0; 8], vec![0.0; 8]]).unwrap_err();
        assert_eq!(err, BackendError::ShapeMismatch);
    }

    #[test]
    fn test_failing_backend_falls_back_per_controller() {
        let inputs = vec![vec![0.3; 8], vec![-0.6; 8], vec![1.0; 8]];

        let mut expected_nets = brains(3, 5);
        let expected: Vec<Vec<f32>> = expected_nets
            .iter_mut()
            .zip(&inputs)
            .map(|(b, i)| b.forward(i))
            .collect();

        let mut nets = brains(3, 5);
        let mut refs: Vec<&mut NeuralController> = nets.iter_mut().collect();
        let mut evaluator = BatchEvaluator::new(Box::new(Broken));
        let outputs = evaluator.evaluate(&mut refs, &inputs);

        assert_eq!(outputs, expected);
        assert_eq!(nets, expected_nets);
        assert_eq!(evaluator.failures(), 1);
        assert!(evaluator.take_fallback().is_some());
        assert!(evaluator.take_fallback().is_none());
    }

    #[test]
    fn test_cpu_batch_matches_forward_across_calls() {
        let mut reference = brains(4, 11);
        // Two identical controllers fed identical inputs.
        reference.push(reference[0].clone());
        let mut nets = reference.clone();
        let mut evaluator = BatchEvaluator::cpu();

        for step in 0..4 {
            let mut inputs: Vec<Vec<f32>> = (0..4)
                .map(|k| (0..8).map(|j| ((k * 8 + j + step) as f32 * 0.37).sin()).collect())
                .collect();
            inputs.push(inputs[0].clone());

            let expected: Vec<Vec<f32>> = reference
                .iter_mut()
                .zip(&inputs)
                .map(|(b, i)| b.forward(i))
                .collect();
            let mut refs: Vec<&mut NeuralController> = nets.iter_mut().collect();
            let outputs = evaluator.evaluate(&mut refs, &inputs);

            assert_eq!(outputs.len(), expected.len());
            for (got, want) in outputs.iter().zip(&expected) {
                assert_eq!(got.len(), want.len());
                for (g, w) in got.iter().zip(want) {
                    assert!((g - w).abs() < 1e-4, "step {}: {} vs {}", step, g, w);
                }
            }
            for (net, want) in nets.iter().zip(&reference) {
                for (g, w) in net.memory().iter().zip(want.memory()) {
                    assert!((g - w).abs() < 1e-4);
                }
            }
            assert_eq!(outputs[0], outputs[4]);
        }
        assert_eq!(evaluator.failures(), 0);
    }
}
