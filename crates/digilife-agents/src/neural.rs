//! Recurrent feed-forward controller.
//!
//! Three dense layers with a short-term memory vector that feeds the second
//! hidden layer. Weight matrices are stored row-major as `[in][out]`, so the
//! weight from input `i` to unit `j` sits at `i * out + j`. The batched
//! backends rely on this layout when flattening many controllers into one
//! buffer.

use digilife_core::config::NeuralConfig;
use rand::Rng;
use rand_distr::StandardNormal;

/// Pre-activations are clamped to this magnitude before sigmoid and tanh,
/// on every execution path.
pub const ACTIVATION_CLAMP: f32 = 10.0;

pub fn relu(x: f32) -> f32 {
    x.max(0.0)
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x.clamp(-ACTIVATION_CLAMP, ACTIVATION_CLAMP)).exp())
}

pub fn tanh(x: f32) -> f32 {
    x.clamp(-ACTIVATION_CLAMP, ACTIVATION_CLAMP).tanh()
}

/// Layer sizes shared by every controller in a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkShape {
    pub inputs: usize,
    pub hidden1: usize,
    /// Also the memory size.
    pub hidden2: usize,
    pub outputs: usize,
}

impl NetworkShape {
    pub fn new(inputs: usize, hidden: usize, outputs: usize) -> Self {
        Self {
            inputs,
            hidden1: hidden,
            hidden2: hidden / 2,
            outputs,
        }
    }

    pub fn from_config(config: &NeuralConfig) -> Self {
        Self::new(config.input_size, config.hidden_size, config.output_size)
    }
}

impl Default for NetworkShape {
    fn default() -> Self {
        Self::new(8, 16, 4)
    }
}

/// Borrowed view of a controller's parameters.
#[derive(Debug, Clone, Copy)]
pub struct NetworkParameters<'a> {
    pub w1: &'a [f32],
    pub b1: &'a [f32],
    pub w2: &'a [f32],
    pub b2: &'a [f32],
    pub w3: &'a [f32],
    pub b3: &'a [f32],
    pub memory: &'a [f32],
}

#[derive(Debug, Clone, PartialEq)]
pub struct NeuralController {
    shape: NetworkShape,
    w1: Vec<f32>,
    b1: Vec<f32>,
    w2: Vec<f32>,
    b2: Vec<f32>,
    w3: Vec<f32>,
    b3: Vec<f32>,
    memory: Vec<f32>,
    memory_decay: f32,
}

impl NeuralController {
    /// Fresh controller with Xavier-scaled Gaussian weights (`sqrt(2 / fan_in)`) and zero biases.
    pub fn random<R: Rng + ?Sized>(shape: NetworkShape, memory_decay: f32, rng: &mut R) -> Self {
        Self {
            w1: gaussian_matrix(shape.inputs, shape.hidden1, rng),
            b1: vec![0.0; shape.hidden1],
            w2: gaussian_matrix(shape.hidden1, shape.hidden2, rng),
            b2: vec![0.0; shape.hidden2],
            w3: gaussian_matrix(shape.hidden2, shape.outputs, rng),
            b3: vec![0.0; shape.outputs],
            memory: vec![0.0; shape.hidden2],
            memory_decay,
            shape,
        }
    }

    /// Copy of `parent` with perturbed weights and an empty memory.
    pub fn inherit<R: Rng + ?Sized>(parent: &NeuralController, rate: f64, strength: f32, rng: &mut R) -> Self {
        let mut child = parent.clone();
        child.reset_memory();
        child.mutate(rate, strength, rng);
        child
    }

    /// Perturb each weight independently with probability `rate`.
    ///
    /// Layer strengths are scaled by 1.2, 1.0 and 0.8 from input to output;
    /// biases move at half the layer strength.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, strength: f32, rng: &mut R) {
        let layers: [(&mut Vec<f32>, &mut Vec<f32>, f32); 3] = [
            (&mut self.w1, &mut self.b1, 1.2),
            (&mut self.w2, &mut self.b2, 1.0),
            (&mut self.w3, &mut self.b3, 0.8),
        ];
        for (weights, biases, scale) in layers {
            perturb(weights, rate, strength * scale, rng);
            perturb(biases, rate, strength * scale * 0.5, rng);
        }
    }

    /// Run one step. Overwrites the memory with the second hidden layer.
    ///
    /// Missing inputs read as zero and surplus inputs are ignored.
    pub fn forward(&mut self, inputs: &[f32]) -> Vec<f32> {
        let s = self.shape;

        let mut h1 = self.b1.clone();
        for (i, &x) in inputs.iter().take(s.inputs).enumerate() {
            let row = &self.w1[i * s.hidden1..(i + 1) * s.hidden1];
            for (acc, w) in h1.iter_mut().zip(row) {
                *acc += x * w;
            }
        }
        for v in h1.iter_mut() {
            *v = relu(*v);
        }

        let mut h2 = self.b2.clone();
        for (i, &x) in h1.iter().enumerate() {
            let row = &self.w2[i * s.hidden2..(i + 1) * s.hidden2];
            for (acc, w) in h2.iter_mut().zip(row) {
                *acc += x * w;
            }
        }
        for (v, m) in h2.iter_mut().zip(&self.memory) {
            *v = tanh(*v + m * self.memory_decay);
        }
        self.memory.copy_from_slice(&h2);

        let mut out = self.b3.clone();
        for (i, &x) in h2.iter().enumerate() {
            let row = &self.w3[i * s.outputs..(i + 1) * s.outputs];
            for (acc, w) in out.iter_mut().zip(row) {
                *acc += x * w;
            }
        }
        for v in out.iter_mut() {
            *v = sigmoid(*v);
        }
        out
    }

    pub fn reset_memory(&mut self) {
        self.memory.iter_mut().for_each(|m| *m = 0.0);
    }

    /// Replace the memory with a value computed elsewhere.
    ///
    /// Returns false and leaves the memory untouched on a length mismatch.
    pub fn set_memory(&mut self, memory: &[f32]) -> bool {
        if memory.len() != self.memory.len() {
            return false;
        }
        self.memory.copy_from_slice(memory);
        true
    }

    pub fn memory(&self) -> &[f32] {
        &self.memory
    }

    pub fn memory_decay(&self) -> f32 {
        self.memory_decay
    }

    pub fn shape(&self) -> NetworkShape {
        self.shape
    }

    pub fn parameters(&self) -> NetworkParameters<'_> {
        NetworkParameters {
            w1: &self.w1,
            b1: &self.b1,
            w2: &self.w2,
            b2: &self.b2,
            w3: &self.w3,
            b3: &self.b3,
            memory: &self.memory,
        }
    }
}

fn gaussian_matrix<R: Rng + ?Sized>(fan_in: usize, fan_out: usize, rng: &mut R) -> Vec<f32> {
    let scale = (2.0 / fan_in.max(1) as f32).sqrt();
    (0..fan_in * fan_out)
        .map(|_| rng.sample::<f32, _>(StandardNormal) * scale)
        .collect()
}

fn perturb<R: Rng + ?Sized>(values: &mut [f32], rate: f64, strength: f32, rng: &mut R) {
    for v in values.iter_mut() {
        if rng.random::<f64>() < rate {
            *v += rng.sample::<f32, _>(StandardNormal) * strength;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn controller(seed: u64) -> NeuralController {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        NeuralController::random(NetworkShape::default(), 0.7, &mut rng)
    }

    #[test]
    fn shape_halves_second_layer() {
        let shape = NetworkShape::new(8, 16, 4);
        assert_eq!(shape.hidden2, 8);
        let net = controller(1);
        assert_eq!(net.memory().len(), 8);
        assert_eq!(net.parameters().w1.len(), 8 * 16);
        assert_eq!(net.parameters().w3.len(), 8 * 4);
    }

    #[test]
    fn outputs_are_probabilities() {
        let mut net = controller(2);
        let out = net.forward(&[1.0, -0.5, 0.2, 0.0, 0.3, 0.9, 0.1, 1.0]);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|&o| (0.0..=1.0).contains(&o)));
    }

    #[test]
    fn forward_updates_memory() {
        let mut net = controller(3);
        let inputs = [0.8, 0.3, -0.2, 0.1, 0.0, 0.5, 0.4, 1.0];
        assert!(net.memory().iter().all(|&m| m == 0.0));
        let first = net.forward(&inputs);
        let memory_after_first = net.memory().to_vec();
        assert!(memory_after_first.iter().all(|m| m.abs() <= 1.0));
        let second = net.forward(&inputs);
        assert_eq!(net.memory().len(), 8);
        if memory_after_first.iter().any(|&m| m != 0.0) {
            assert_ne!(first, second);
        }
        net.reset_memory();
        assert_eq!(net.forward(&inputs), first);
    }

    #[test]
    fn identical_controllers_agree() {
        let mut a = controller(4);
        let mut b = a.clone();
        let inputs = [0.5; 8];
        assert_eq!(a.forward(&inputs), b.forward(&inputs));
    }

    #[test]
    fn inheritance_perturbs_some_weights() {
        let parent = controller(5);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let child = NeuralController::inherit(&parent, 0.15, 0.2, &mut rng);
        assert_eq!(child.shape(), parent.shape());
        assert_ne!(child.parameters().w1, parent.parameters().w1);

        let unchanged = NeuralController::inherit(&parent, 0.0, 0.2, &mut rng);
        assert_eq!(unchanged.parameters().w2, parent.parameters().w2);
    }

    #[test]
    fn set_memory_rejects_wrong_length() {
        let mut net = controller(6);
        assert!(!net.set_memory(&[1.0; 3]));
        assert!(net.set_memory(&[0.5; 8]));
        assert_eq!(net.memory(), &[0.5; 8]);
    }

    #[test]
    fn activation_clamps() {
        assert_eq!(relu(-3.0), 0.0);
        assert!((sigmoid(1000.0) - sigmoid(10.0)).abs() < f32::EPSILON);
        assert!((tanh(-50.0) - (-10.0f32).tanh()).abs() < f32::EPSILON);
    }
}
