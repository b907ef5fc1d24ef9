use std::path::Path;

use rand::rngs::StdRng;
use serde::{Serialize, Deserialize};

use crate::error::{HarnessError, Result};
use crate::math::matrix::Matrix;

/// A trainable model the harness can fit, checkpoint and evaluate.
///
/// Inputs are given per branch: a single-input model has one branch, a
/// triple-branch model receives three slices for every sample. Parameters
/// are exposed as an ordered list of matrices; `backward` returns gradients
/// in the same order.
pub trait Model {
    /// Number of input branches the model expects.
    fn branch_count(&self) -> usize;

    /// Expected input width of each branch.
    fn input_sizes(&self) -> Vec<usize>;

    /// Width of the model output.
    fn output_size(&self) -> usize;

    /// Inference pass. Does not touch cached training state.
    fn predict(&self, inputs: &[&[f64]]) -> Vec<f64>;

    /// Training pass; caches activations for `backward`.
    fn forward(&mut self, inputs: &[&[f64]]) -> Vec<f64>;

    /// Gradients of the loss w.r.t. every parameter, for the last `forward`.
    fn backward(&mut self, output_grad: &[f64]) -> Vec<Matrix>;

    fn parameters(&self) -> Vec<&Matrix>;

    fn parameters_mut(&mut self) -> Vec<&mut Matrix>;

    /// Re-draws every parameter from its initializer.
    fn reset_parameters(&mut self, rng: &mut StdRng);

    /// Persists the complete model (architecture and weights).
    fn save(&self, path: &Path) -> Result<()>;

    /// Copies the current parameters.
    fn snapshot(&self) -> Weights {
        Weights {
            tensors: self.parameters().into_iter().cloned().collect(),
        }
    }

    /// Overwrites the parameters; shapes must match exactly.
    fn restore(&mut self, weights: &Weights) -> Result<()> {
        let mut params = self.parameters_mut();
        if params.len() != weights.tensors.len() {
            return Err(HarnessError::shape(format!(
                "model has {} parameter tensors, weights have {}",
                params.len(),
                weights.tensors.len()
            )));
        }
        for (i, (param, saved)) in params.iter().zip(weights.tensors.iter()).enumerate() {
            if !param.same_shape(saved) {
                return Err(HarnessError::shape(format!(
                    "parameter {i}: expected {}x{}, found {}x{}",
                    param.rows, param.cols, saved.rows, saved.cols
                )));
            }
        }
        for (param, saved) in params.iter_mut().zip(weights.tensors.iter()) {
            **param = saved.clone();
        }
        Ok(())
    }

    fn save_weights(&self, path: &Path) -> Result<()> {
        self.snapshot().save_json(path)
    }

    fn load_weights(&mut self, path: &Path) -> Result<()> {
        let weights = Weights::load_json(path)?;
        self.restore(&weights)
    }
}

/// Ordered parameter tensors of a model; the checkpoint payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub tensors: Vec<Matrix>,
}

impl Weights {
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Weights> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
