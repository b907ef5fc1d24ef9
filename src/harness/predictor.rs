use std::path::Path;

use crate::data::encoding::argmax;
use crate::error::{HarnessError, Result};
use crate::harness::trainer::check_feature_widths;
use crate::network::model::Model;
use crate::network::spec::TRIPLE_BRANCHES;

/// Scores a trained model on held-out data.
///
/// Implementations must be deterministic for fixed weights and data and must
/// not modify the model.
pub trait Predictor {
    fn predict_accuracy(
        &self,
        model: &dyn Model,
        test_features: &[Vec<f64>],
        test_labels: &[Vec<f64>],
        checkpoint: &Path,
        multi_input: bool,
    ) -> Result<f64>;
}

/// Classification accuracy: a sample is correct when the argmax of the
/// prediction equals the argmax of its one-hot label.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgmaxAccuracy;

impl Predictor for ArgmaxAccuracy {
    fn predict_accuracy(
        &self,
        model: &dyn Model,
        test_features: &[Vec<f64>],
        test_labels: &[Vec<f64>],
        checkpoint: &Path,
        multi_input: bool,
    ) -> Result<f64> {
        if test_features.len() != test_labels.len() {
            return Err(HarnessError::shape(format!(
                "{} test samples but {} test labels",
                test_features.len(),
                test_labels.len()
            )));
        }
        if test_features.is_empty() {
            return Err(HarnessError::invalid_input("empty test set"));
        }
        let copies = if multi_input { TRIPLE_BRANCHES } else { 1 };
        if model.branch_count() != copies {
            return Err(HarnessError::shape(format!(
                "model has {} input branches, evaluation feeds {copies}",
                model.branch_count()
            )));
        }
        check_feature_widths(model, test_features, "test")?;

        let correct = test_features.iter().zip(test_labels)
            .filter(|(x, y)| {
                let prediction = model.predict(&vec![x.as_slice(); copies]);
                argmax(&prediction) == argmax(y)
            })
            .count();
        let accuracy = correct as f64 / test_features.len() as f64;

        tracing::info!(
            checkpoint = %checkpoint.display(),
            correct,
            total = test_features.len(),
            "test accuracy {:.4}",
            accuracy
        );
        Ok(accuracy)
    }
}
