use serde::{Serialize, Deserialize};

use crate::data::encoding::argmax;
use crate::loss::loss_type::LossType;
use crate::network::model::Model;
use crate::optim::adam::Adam;

/// Metric reported next to the loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Resolved by loss: element-wise thresholded accuracy for binary
    /// cross-entropy, argmax accuracy for categorical cross-entropy.
    Accuracy,
    BinaryAccuracy,
    CategoricalAccuracy,
}

impl Metric {
    fn resolve(self, loss: LossType) -> Metric {
        match (self, loss) {
            (Metric::Accuracy, LossType::BinaryCrossEntropy) => Metric::BinaryAccuracy,
            (Metric::Accuracy, LossType::CategoricalCrossEntropy) => Metric::CategoricalAccuracy,
            (m, _) => m,
        }
    }
}

/// What `compile` takes: loss, optimizer learning rate, metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileOptions {
    pub loss: LossType,
    pub learning_rate: f64,
    pub metric: Metric,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            loss: LossType::BinaryCrossEntropy,
            learning_rate: 0.001,
            metric: Metric::Accuracy,
        }
    }
}

/// Loss, Adam optimizer and metric bound together for one training run.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub loss: LossType,
    pub optimizer: Adam,
    pub metric: Metric,
}

impl Compiled {
    pub fn new(options: &CompileOptions) -> Compiled {
        Compiled {
            loss: options.loss,
            optimizer: Adam::new(options.learning_rate),
            metric: options.metric.resolve(options.loss),
        }
    }

    /// Fraction of correct predictions under the compiled metric.
    pub fn score(&self, predictions: &[Vec<f64>], labels: &[Vec<f64>]) -> f64 {
        metric_value(self.metric, predictions, labels)
    }

    /// Mean loss and metric of `model` over a labelled set, using the
    /// inference pass. `input_copies` is the number of branches fed.
    pub fn evaluate(
        &self,
        model: &dyn Model,
        features: &[Vec<f64>],
        labels: &[Vec<f64>],
        input_copies: usize,
    ) -> (f64, f64) {
        if features.is_empty() {
            return (0.0, 0.0);
        }
        let predictions: Vec<Vec<f64>> = features.iter()
            .map(|x| model.predict(&vec![x.as_slice(); input_copies]))
            .collect();
        let loss = predictions.iter().zip(labels)
            .map(|(p, y)| self.loss.loss(p, y))
            .sum::<f64>() / features.len() as f64;
        (loss, self.score(&predictions, labels))
    }
}

/// Computes `metric` over paired prediction/label rows. Empty input scores 0.
pub fn metric_value(metric: Metric, predictions: &[Vec<f64>], labels: &[Vec<f64>]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let per_sample = |p: &Vec<f64>, y: &Vec<f64>| -> f64 {
        match metric {
            Metric::CategoricalAccuracy => f64::from(u8::from(argmax(p) == argmax(y))),
            Metric::BinaryAccuracy | Metric::Accuracy => {
                let hits = p.iter().zip(y)
                    .filter(|(pi, yi)| (**pi > 0.5) == (**yi > 0.5))
                    .count();
                hits as f64 / p.len().max(1) as f64
            }
        }
    };
    predictions.iter().zip(labels)
        .map(|(p, y)| per_sample(p, y))
        .sum::<f64>() / predictions.len() as f64
}
