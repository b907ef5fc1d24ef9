use serde::{Serialize, Deserialize};

use crate::loss::bce::BceLoss;
use crate::loss::cross_entropy::CrossEntropyLoss;

/// Selects which loss a compiled model trains with.
///
/// - `BinaryCrossEntropy`     : pair with Sigmoid outputs (one-hot or multi-label).
/// - `CategoricalCrossEntropy`: pair with a Softmax output layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    BinaryCrossEntropy,
    CategoricalCrossEntropy,
}

impl LossType {
    pub fn loss(self, predicted: &[f64], expected: &[f64]) -> f64 {
        match self {
            LossType::BinaryCrossEntropy => BceLoss::loss(predicted, expected),
            LossType::CategoricalCrossEntropy => CrossEntropyLoss::loss(predicted, expected),
        }
    }

    pub fn derivative(self, predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        match self {
            LossType::BinaryCrossEntropy => BceLoss::derivative(predicted, expected),
            LossType::CategoricalCrossEntropy => CrossEntropyLoss::derivative(predicted, expected),
        }
    }
}
