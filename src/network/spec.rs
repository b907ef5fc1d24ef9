use std::path::Path;

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{HarnessError, Result};
use crate::layers::dense::Dense;
use crate::network::network::{Branch, Network};

/// Number of input branches in a triple-branch model.
pub const TRIPLE_BRANCHES: usize = 3;

/// One dense layer in a network specification.
///
/// Fields:
/// - `size`      : number of neurons in this layer
/// - `input_size`: width of the vector feeding this layer
/// - `activation`: activation function applied after the linear transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
}

/// One input branch: the raw input width and the layers stacked on it.
/// An empty layer list passes the input straight to the head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchSpec {
    pub input_size: usize,
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
}

impl BranchSpec {
    fn output_size(&self) -> usize {
        self.layers.last().map(|l| l.size).unwrap_or(self.input_size)
    }
}

/// Serializable architecture description; `build` turns it into a `Network`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name, also used as the default run name.
    pub name: String,
    pub branches: Vec<BranchSpec>,
    /// Layers applied to the concatenated branch outputs.
    pub head: Vec<LayerSpec>,
}

impl NetworkSpec {
    /// Plain feed-forward stack on a single input.
    pub fn single(name: &str, input_size: usize, layers: &[(usize, ActivationFunction)]) -> NetworkSpec {
        NetworkSpec {
            name: name.to_string(),
            branches: vec![BranchSpec { input_size, layers: Vec::new() }],
            head: chain(input_size, layers),
        }
    }

    /// Three identical branches over the same input width, concatenated and
    /// followed by `head_layers`.
    pub fn triple_branch(
        name: &str,
        input_size: usize,
        branch_layers: &[(usize, ActivationFunction)],
        head_layers: &[(usize, ActivationFunction)],
    ) -> NetworkSpec {
        let branch = BranchSpec { input_size, layers: chain(input_size, branch_layers) };
        let concat_width = branch.output_size() * TRIPLE_BRANCHES;
        NetworkSpec {
            name: name.to_string(),
            branches: vec![branch; TRIPLE_BRANCHES],
            head: chain(concat_width, head_layers),
        }
    }

    /// Checks that consecutive layer widths line up.
    pub fn validate(&self) -> Result<()> {
        if self.branches.is_empty() {
            return Err(HarnessError::Config(format!("network '{}' has no input branch", self.name)));
        }
        if self.head.is_empty() {
            return Err(HarnessError::Config(format!("network '{}' has no head layers", self.name)));
        }
        for (b, branch) in self.branches.iter().enumerate() {
            check_chain(&self.name, &format!("branch {b}"), branch.input_size, &branch.layers)?;
        }
        let concat_width: usize = self.branches.iter().map(BranchSpec::output_size).sum();
        check_chain(&self.name, "head", concat_width, &self.head)
    }

    /// Validates the spec and initializes every layer from `rng`.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network> {
        self.validate()?;
        let mut make = |l: &LayerSpec| Dense::new(l.size, l.input_size, l.activation.clone(), rng);
        let branches = self.branches.iter()
            .map(|b| Branch {
                input_size: b.input_size,
                layers: b.layers.iter().map(&mut make).collect(),
            })
            .collect();
        let head = self.head.iter().map(&mut make).collect();
        Ok(Network { name: self.name.clone(), branches, head })
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &Path) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

fn chain(input_size: usize, layers: &[(usize, ActivationFunction)]) -> Vec<LayerSpec> {
    let mut width = input_size;
    layers.iter()
        .map(|(size, activation)| {
            let spec = LayerSpec { size: *size, input_size: width, activation: activation.clone() };
            width = *size;
            spec
        })
        .collect()
}

fn check_chain(name: &str, part: &str, input_size: usize, layers: &[LayerSpec]) -> Result<()> {
    let mut width = input_size;
    for (i, layer) in layers.iter().enumerate() {
        if layer.input_size != width {
            return Err(HarnessError::Config(format!(
                "network '{name}', {part} layer {i}: input_size {} does not match incoming width {width}",
                layer.input_size
            )));
        }
        width = layer.size;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chains_widths() {
        let spec = NetworkSpec::single("mlp", 4, &[
            (8, ActivationFunction::ReLU),
            (2, ActivationFunction::Sigmoid),
        ]);
        assert_eq!(spec.head[0].input_size, 4);
        assert_eq!(spec.head[1].input_size, 8);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_triple_branch_head_takes_concatenation() {
        let spec = NetworkSpec::triple_branch(
            "tri", 5,
            &[(3, ActivationFunction::Tanh)],
            &[(2, ActivationFunction::Sigmoid)],
        );
        assert_eq!(spec.branches.len(), TRIPLE_BRANCHES);
        assert_eq!(spec.head[0].input_size, 9);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_broken_chain() {
        let mut spec = NetworkSpec::single("bad", 4, &[(2, ActivationFunction::Sigmoid)]);
        spec.head[0].input_size = 3;
        assert!(matches!(spec.validate(), Err(HarnessError::Config(_))));
    }
}
