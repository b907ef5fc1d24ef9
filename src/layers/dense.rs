use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{activation::activation::ActivationFunction, math::matrix::Matrix};

/// Fully connected layer: `a = f(x·W + b)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dense {
    pub size: usize,
    pub input_size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction,
    #[serde(skip)]
    cache: Option<ForwardCache>,
}

/// Values from the last training forward pass, needed by `backward`.
#[derive(Debug, Clone)]
struct ForwardCache {
    input: Vec<f64>,
    pre_activation: Vec<f64>,
    output: Vec<f64>,
}

/// Gradients of one sample w.r.t. a layer's parameters and its input.
pub struct DenseGradients {
    pub weights: Matrix,
    pub biases: Matrix,
    pub input: Vec<f64>,
}

impl Dense {
    /// Creates a layer with freshly initialized weights and zero biases.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Dense {
        Dense {
            size,
            input_size,
            weights: initial_weights(input_size, size, &activation, rng),
            biases: Matrix::zeros(1, size),
            activator: activation,
            cache: None,
        }
    }

    /// Draws fresh weights, zeroes the biases and drops any cached state.
    /// Uses the same initializer as `new`.
    pub fn reset_parameters<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.weights = initial_weights(self.input_size, self.size, &self.activator, rng);
        self.biases = Matrix::zeros(1, self.size);
        self.cache = None;
    }

    fn pre_activation(&self, input: &[f64]) -> Vec<f64> {
        let z = Matrix::row(input) * self.weights.clone() + self.biases.clone();
        z.data.into_iter().next().unwrap_or_default()
    }

    /// Inference pass; leaves the layer untouched.
    pub fn predict(&self, input: &[f64]) -> Vec<f64> {
        self.activator.apply(&self.pre_activation(input))
    }

    /// Training pass; caches what `backward` needs.
    pub fn forward(&mut self, input: &[f64]) -> Vec<f64> {
        let pre_activation = self.pre_activation(input);
        let output = self.activator.apply(&pre_activation);
        self.cache = Some(ForwardCache {
            input: input.to_vec(),
            pre_activation,
            output: output.clone(),
        });
        output
    }

    /// Backpropagates `grad_output` (∂L/∂a) through the last `forward` call.
    ///
    /// # Panics
    /// Panics if `forward` has not been called since the last reset.
    pub fn backward(&self, grad_output: &[f64]) -> DenseGradients {
        let cache = self.cache.as_ref()
            .expect("Dense::backward called before Dense::forward");

        let delta = self.activator.backprop(&cache.pre_activation, &cache.output, grad_output);
        let delta_row = Matrix::row(&delta);

        let weights = Matrix::row(&cache.input).transpose() * delta_row.clone();
        let input = (delta_row * self.weights.transpose())
            .data
            .into_iter()
            .next()
            .unwrap_or_default();

        DenseGradients {
            weights,
            biases: Matrix::row(&delta),
            input,
        }
    }
}

/// He initialization for rectifiers, Glorot-uniform otherwise.
fn initial_weights<R: Rng + ?Sized>(
    input_size: usize,
    size: usize,
    activation: &ActivationFunction,
    rng: &mut R,
) -> Matrix {
    match activation {
        ActivationFunction::ReLU | ActivationFunction::LeakyReLU { .. } => Matrix::he(input_size, size, rng),
        _ => Matrix::glorot_uniform(input_size, size, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn identity_layer() -> Dense {
        let mut rng = StdRng::seed_from_u64(1);
        let mut layer = Dense::new(1, 2, ActivationFunction::Identity, &mut rng);
        layer.weights = Matrix::from_data(vec![vec![2.0], vec![-1.0]]);
        layer.biases = Matrix::row(&[0.5]);
        layer
    }

    #[test]
    fn test_predict_and_forward_agree() {
        let mut layer = identity_layer();
        let p = layer.predict(&[1.0, 3.0]);
        let f = layer.forward(&[1.0, 3.0]);
        assert_eq!(p, f);
        assert_eq!(p, vec![-0.5]);
    }

    #[test]
    fn test_backward_gradients() {
        let mut layer = identity_layer();
        layer.forward(&[1.0, 3.0]);
        let g = layer.backward(&[1.0]);
        assert_eq!(g.weights.data, vec![vec![1.0], vec![3.0]]);
        assert_eq!(g.biases.data, vec![vec![1.0]]);
        assert_eq!(g.input, vec![2.0, -1.0]);
    }

    #[test]
    fn test_new_and_reset_draw_from_same_initializer() {
        let act = ActivationFunction::ReLU;
        let fresh = Dense::new(3, 4, act.clone(), &mut StdRng::seed_from_u64(5));
        let mut reset = Dense::new(3, 4, act, &mut StdRng::seed_from_u64(6));
        reset.reset_parameters(&mut StdRng::seed_from_u64(5));
        assert_eq!(fresh.weights, reset.weights);
    }

    #[test]
    fn test_reset_changes_weights_and_zeroes_biases() {
        let mut layer = identity_layer();
        let before = layer.weights.clone();
        layer.reset_parameters(&mut StdRng::seed_from_u64(99));
        assert_ne!(layer.weights, before);
        assert!(layer.biases.iter().all(|&b| b == 0.0));
    }
}
