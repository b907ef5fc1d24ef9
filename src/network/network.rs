use std::path::Path;

use rand::rngs::StdRng;
use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::layers::dense::Dense;
use crate::math::matrix::Matrix;
use crate::network::model::Model;

/// One input branch. With no layers the raw input is forwarded unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub input_size: usize,
    pub layers: Vec<Dense>,
}

impl Branch {
    fn output_size(&self) -> usize {
        self.layers.last().map(|l| l.size).unwrap_or(self.input_size)
    }
}

/// Dense network with one or more input branches whose outputs are
/// concatenated and passed through a shared head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub branches: Vec<Branch>,
    pub head: Vec<Dense>,
}

impl Network {
    fn layers(&self) -> impl Iterator<Item = &Dense> {
        self.branches.iter()
            .flat_map(|b| b.layers.iter())
            .chain(self.head.iter())
    }

    fn layers_mut(&mut self) -> impl Iterator<Item = &mut Dense> {
        self.branches.iter_mut()
            .flat_map(|b| b.layers.iter_mut())
            .chain(self.head.iter_mut())
    }

    fn check_inputs(&self, inputs: &[&[f64]]) {
        assert_eq!(
            inputs.len(),
            self.branches.len(),
            "network '{}' expects {} input branches",
            self.name,
            self.branches.len()
        );
        for (branch, input) in self.branches.iter().zip(inputs) {
            assert_eq!(input.len(), branch.input_size, "input width mismatch");
        }
    }

    /// Deserializes a network from a JSON file previously written by `save`.
    pub fn load_json(path: &Path) -> Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Model for Network {
    fn branch_count(&self) -> usize {
        self.branches.len()
    }

    fn input_sizes(&self) -> Vec<usize> {
        self.branches.iter().map(|b| b.input_size).collect()
    }

    fn output_size(&self) -> usize {
        self.head.last().map(|l| l.size).unwrap_or(0)
    }

    fn predict(&self, inputs: &[&[f64]]) -> Vec<f64> {
        self.check_inputs(inputs);
        let mut concat = Vec::new();
        for (branch, input) in self.branches.iter().zip(inputs) {
            let out = branch.layers.iter()
                .fold(input.to_vec(), |current, layer| layer.predict(&current));
            concat.extend(out);
        }
        self.head.iter().fold(concat, |current, layer| layer.predict(&current))
    }

    fn forward(&mut self, inputs: &[&[f64]]) -> Vec<f64> {
        self.check_inputs(inputs);
        let mut concat = Vec::new();
        for (branch, input) in self.branches.iter_mut().zip(inputs) {
            let mut current = input.to_vec();
            for layer in &mut branch.layers {
                current = layer.forward(&current);
            }
            concat.extend(current);
        }
        let mut current = concat;
        for layer in &mut self.head {
            current = layer.forward(&current);
        }
        current
    }

    fn backward(&mut self, output_grad: &[f64]) -> Vec<Matrix> {
        // Head, last layer first.
        let mut grad = output_grad.to_vec();
        let mut head_grads = Vec::with_capacity(self.head.len());
        for layer in self.head.iter().rev() {
            let g = layer.backward(&grad);
            grad = g.input;
            head_grads.push((g.weights, g.biases));
        }
        head_grads.reverse();

        // Split the concatenation gradient back into branches.
        let mut branch_grads = Vec::with_capacity(self.branches.len());
        let mut offset = 0;
        for branch in &self.branches {
            let width = branch.output_size();
            let mut grad = grad[offset..offset + width].to_vec();
            offset += width;

            let mut layer_grads = Vec::with_capacity(branch.layers.len());
            for layer in branch.layers.iter().rev() {
                let g = layer.backward(&grad);
                grad = g.input;
                layer_grads.push((g.weights, g.biases));
            }
            layer_grads.reverse();
            branch_grads.extend(layer_grads);
        }

        branch_grads.into_iter()
            .chain(head_grads)
            .flat_map(|(w, b)| [w, b])
            .collect()
    }

    fn parameters(&self) -> Vec<&Matrix> {
        let mut params = Vec::new();
        for layer in self.layers() {
            params.push(&layer.weights);
            params.push(&layer.biases);
        }
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Matrix> {
        let mut params = Vec::new();
        for layer in self.layers_mut() {
            params.push(&mut layer.weights);
            params.push(&mut layer.biases);
        }
        params
    }

    fn reset_parameters(&mut self, rng: &mut StdRng) {
        for layer in self.layers_mut() {
            layer.reset_parameters(rng);
        }
    }

    /// Serializes the whole network (architecture and weights) as JSON.
    fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::network::spec::NetworkSpec;
    use rand::SeedableRng;

    fn tri_net() -> Network {
        NetworkSpec::triple_branch(
            "tri", 3,
            &[(2, ActivationFunction::Tanh)],
            &[(2, ActivationFunction::Sigmoid)],
        )
        .build(&mut StdRng::seed_from_u64(3))
        .unwrap()
    }

    #[test]
    fn test_parameter_and_gradient_order_match() {
        let mut net = tri_net();
        let x = [0.1, -0.4, 0.9];
        net.forward(&[&x, &x, &x]);
        let grads = net.backward(&[1.0, -1.0]);
        let params = net.parameters();
        assert_eq!(grads.len(), params.len());
        for (g, p) in grads.iter().zip(params) {
            assert!(g.same_shape(p));
        }
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let mut net = NetworkSpec::single("fd", 2, &[
            (3, ActivationFunction::Tanh),
            (1, ActivationFunction::Sigmoid),
        ])
        .build(&mut StdRng::seed_from_u64(11))
        .unwrap();
        let x = [0.5, -0.25];

        // L = output[0], so ∂L/∂output = 1.
        net.forward(&[&x]);
        let grads = net.backward(&[1.0]);

        let eps = 1e-6;
        let original = net.parameters()[0].data[1][2];
        net.parameters_mut()[0].data[1][2] = original + eps;
        let plus = net.predict(&[&x])[0];
        net.parameters_mut()[0].data[1][2] = original - eps;
        let minus = net.predict(&[&x])[0];
        let numeric = (plus - minus) / (2.0 * eps);
        assert!((numeric - grads[0].data[1][2]).abs() < 1e-6);
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut net = tri_net();
        let saved = net.snapshot();
        let x = [1.0, 0.0, -1.0];
        let before = net.predict(&[&x, &x, &x]);
        net.reset_parameters(&mut StdRng::seed_from_u64(1234));
        assert_ne!(net.predict(&[&x, &x, &x]), before);
        net.restore(&saved).unwrap();
        assert_eq!(net.predict(&[&x, &x, &x]), before);
    }

    #[test]
    fn test_restore_rejects_foreign_weights() {
        let mut net = tri_net();
        let other = NetworkSpec::single("o", 3, &[(2, ActivationFunction::Sigmoid)])
            .build(&mut StdRng::seed_from_u64(0))
            .unwrap();
        assert!(net.restore(&other.snapshot()).is_err());
    }
}
