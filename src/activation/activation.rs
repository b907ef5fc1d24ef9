use serde::{Serialize, Deserialize};
use std::f64::consts::E;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    Tanh,
    LeakyReLU { alpha: f64 },
    /// Vector-valued; `Dense` applies it over the whole pre-activation row.
    Softmax,
}

impl ActivationFunction {
    /// Applies the activation to a full pre-activation vector.
    pub fn apply(&self, z: &[f64]) -> Vec<f64> {
        match self {
            ActivationFunction::Softmax => softmax(z),
            _ => z.iter().map(|&x| self.function(x)).collect(),
        }
    }

    /// Maps ∂L/∂a back to ∂L/∂z for one sample.
    ///
    /// `z` is the cached pre-activation and `a` the cached activation.
    pub fn backprop(&self, z: &[f64], a: &[f64], grad_a: &[f64]) -> Vec<f64> {
        match self {
            ActivationFunction::Softmax => {
                // Full Jacobian-vector product: δ_j = a_j (g_j - Σ_k g_k a_k)
                let dot: f64 = grad_a.iter().zip(a.iter()).map(|(g, s)| g * s).sum();
                a.iter().zip(grad_a.iter()).map(|(s, g)| s * (g - dot)).collect()
            }
            _ => z.iter().zip(grad_a.iter())
                .map(|(&x, g)| g * self.derivative(x))
                .collect(),
        }
    }

    fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            ActivationFunction::Softmax => unreachable!("softmax is applied over the whole row"),
        }
    }

    fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Identity => 1.0,
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { *alpha },
            ActivationFunction::Softmax => unreachable!("softmax is applied over the whole row"),
        }
    }
}

fn softmax(z: &[f64]) -> Vec<f64> {
    let max = z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = z.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let a = ActivationFunction::Softmax.apply(&[1.0, 2.0, 3.0]);
        assert!((a.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(a[2] > a[1] && a[1] > a[0]);
    }

    #[test]
    fn test_sigmoid_backprop_matches_derivative() {
        let z = [0.0];
        let a = ActivationFunction::Sigmoid.apply(&z);
        let d = ActivationFunction::Sigmoid.backprop(&z, &a, &[1.0]);
        assert!((d[0] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_relu_blocks_negative_gradient() {
        let z = [-1.0, 2.0];
        let a = ActivationFunction::ReLU.apply(&z);
        assert_eq!(a, vec![0.0, 2.0]);
        assert_eq!(ActivationFunction::ReLU.backprop(&z, &a, &[3.0, 3.0]), vec![0.0, 3.0]);
    }

    #[test]
    fn test_softmax_backprop_of_uniform_gradient_is_zero() {
        let z = [0.3, -0.2, 1.1];
        let a = ActivationFunction::Softmax.apply(&z);
        let d = ActivationFunction::Softmax.backprop(&z, &a, &[1.0, 1.0, 1.0]);
        assert!(d.iter().all(|x| x.abs() < 1e-12));
    }
}
