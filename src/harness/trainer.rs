use std::path::PathBuf;

use serde::{Serialize, Deserialize};

use crate::error::{HarnessError, Result};
use crate::harness::artifacts::ArtifactStore;
use crate::harness::predictor::{ArgmaxAccuracy, Predictor};
use crate::network::model::Model;
use crate::network::spec::TRIPLE_BRANCHES;
use crate::train::callbacks::{CallbackList, EarlyStopping, ModelCheckpoint, Monitor, ReduceLrOnPlateau};
use crate::train::compile::{CompileOptions, Compiled};
use crate::train::epoch_stats::History;
use crate::train::fit::{fit, validation_boundary};
use crate::train::train_config::FitConfig;

/// Settings for one `Trainer::train` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainOptions {
    pub epochs: usize,
    /// Trailing fraction of the training samples held out for validation.
    pub validation_fraction: f64,
    /// Feed every sample to the three branches of a triple-branch model.
    pub multi_input: bool,
    pub batch_size: usize,
    pub shuffle: bool,
    pub shuffle_seed: Option<u64>,
    /// Epochs without a `val_accuracy` improvement before training stops.
    pub early_stopping_patience: usize,
    /// Epochs without a `val_loss` improvement before the learning rate drops.
    pub lr_patience: usize,
    pub lr_factor: f64,
    pub compile: CompileOptions,
}

impl Default for TrainOptions {
    fn default() -> Self {
        TrainOptions {
            epochs: 100,
            validation_fraction: 0.04,
            multi_input: false,
            batch_size: 64,
            shuffle: true,
            shuffle_seed: None,
            early_stopping_patience: 25,
            lr_patience: 5,
            lr_factor: 0.1,
            compile: CompileOptions::default(),
        }
    }
}

impl TrainOptions {
    fn input_copies(&self) -> usize {
        if self.multi_input { TRIPLE_BRANCHES } else { 1 }
    }
}

/// Outcome of one training run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Test accuracy of the restored checkpoint.
    pub accuracy: f64,
    /// Checkpoint the accuracy was measured on.
    pub checkpoint: PathBuf,
    pub history: History,
}

/// Runs one checkpointed training session and scores the best weights.
pub struct Trainer<P: Predictor = ArgmaxAccuracy> {
    artifacts: ArtifactStore,
    predictor: P,
}

impl Trainer<ArgmaxAccuracy> {
    pub fn new(artifacts: ArtifactStore) -> Self {
        Trainer { artifacts, predictor: ArgmaxAccuracy }
    }
}

impl<P: Predictor> Trainer<P> {
    pub fn with_predictor(artifacts: ArtifactStore, predictor: P) -> Self {
        Trainer { artifacts, predictor }
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Trains `model` on the training set, reloads the weights with the
    /// lowest validation loss and returns their test accuracy.
    ///
    /// The checkpoint file `{run_name}_{n}.json` is created before the first
    /// epoch and overwritten on every strict `val_loss` improvement. Training
    /// stops early once `val_accuracy` has stalled for
    /// `early_stopping_patience` epochs; the learning rate is multiplied by
    /// `lr_factor` after `lr_patience` epochs without a `val_loss` gain.
    ///
    /// When `validation_fraction` leaves no validation samples the callbacks
    /// monitor the training loss and accuracy instead.
    #[allow(clippy::too_many_arguments)]
    pub fn train(
        &self,
        model: &mut dyn Model,
        train_features: &[Vec<f64>],
        test_features: &[Vec<f64>],
        train_labels: &[Vec<f64>],
        test_labels: &[Vec<f64>],
        run_name: &str,
        options: &TrainOptions,
    ) -> Result<RunResult> {
        check_train_inputs(&*model, train_features, test_features, train_labels, test_labels, options)?;

        let checkpoint = self.artifacts.next_checkpoint_path(run_name);
        println!("New model name: {}", checkpoint.display());
        tracing::info!(checkpoint = %checkpoint.display(), "training new model");

        let (loss_monitor, accuracy_monitor) =
            if validation_boundary(train_features.len(), options.validation_fraction) < train_features.len() {
                (Monitor::ValLoss, Monitor::ValAccuracy)
            } else {
                tracing::warn!(
                    validation_fraction = options.validation_fraction,
                    "no validation samples, monitoring training loss and accuracy"
                );
                (Monitor::Loss, Monitor::Accuracy)
            };

        let mut callbacks = CallbackList::new();
        callbacks.push(ModelCheckpoint::new(&checkpoint, loss_monitor));
        callbacks.push(EarlyStopping::new(accuracy_monitor, options.early_stopping_patience));
        callbacks.push(ReduceLrOnPlateau::new(loss_monitor, options.lr_factor, options.lr_patience));

        let mut compiled = Compiled::new(&options.compile);
        let fit_config = FitConfig {
            epochs: options.epochs,
            batch_size: options.batch_size,
            shuffle: options.shuffle,
            validation_split: options.validation_fraction,
            input_copies: options.input_copies(),
            seed: options.shuffle_seed,
        };
        let history = fit(model, &mut compiled, train_features, train_labels, &fit_config, &mut callbacks)?;
        if let Some(last) = history.last() {
            tracing::info!(
                epochs = history.len(),
                stopped_early = history.stopped_early,
                loss = last.loss,
                val_loss = ?last.val_loss,
                "training finished"
            );
        }

        model.load_weights(&checkpoint)?;
        let accuracy = self.predictor.predict_accuracy(
            &*model,
            test_features,
            test_labels,
            &checkpoint,
            options.multi_input,
        )?;

        Ok(RunResult { accuracy, checkpoint, history })
    }
}

fn check_train_inputs(
    model: &dyn Model,
    train_features: &[Vec<f64>],
    test_features: &[Vec<f64>],
    train_labels: &[Vec<f64>],
    test_labels: &[Vec<f64>],
    options: &TrainOptions,
) -> Result<()> {
    if train_features.len() != train_labels.len() {
        return Err(HarnessError::shape(format!(
            "{} training samples but {} training labels",
            train_features.len(),
            train_labels.len()
        )));
    }
    if test_features.len() != test_labels.len() {
        return Err(HarnessError::shape(format!(
            "{} test samples but {} test labels",
            test_features.len(),
            test_labels.len()
        )));
    }
    if !(0.0..1.0).contains(&options.validation_fraction) {
        return Err(HarnessError::invalid_input(format!(
            "validation_fraction must be in [0, 1), got {}",
            options.validation_fraction
        )));
    }
    let copies = options.input_copies();
    if model.branch_count() != copies {
        return Err(HarnessError::shape(format!(
            "model has {} input branches but multi_input={} feeds {copies}",
            model.branch_count(),
            options.multi_input
        )));
    }
    check_feature_widths(model, test_features, "test")
}

/// Every row must match the width of every branch it is fed to.
pub(crate) fn check_feature_widths(model: &dyn Model, features: &[Vec<f64>], set: &str) -> Result<()> {
    let sizes = model.input_sizes();
    for (row, x) in features.iter().enumerate() {
        if let Some(b) = sizes.iter().position(|&w| w != x.len()) {
            return Err(HarnessError::shape(format!(
                "{set} sample {row} has {} features, branch {b} expects {}",
                x.len(),
                sizes[b]
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::data::{encoding::to_categorical, synthetic};
    use crate::network::spec::NetworkSpec;
    use rand::{rngs::StdRng, SeedableRng};

    fn small_options(epochs: usize) -> TrainOptions {
        TrainOptions {
            epochs,
            validation_fraction: 0.25,
            batch_size: 8,
            shuffle_seed: Some(5),
            ..TrainOptions::default()
        }
    }

    #[test]
    fn test_defaults() {
        let o = TrainOptions::default();
        assert_eq!((o.epochs, o.batch_size, o.early_stopping_patience, o.lr_patience), (100, 64, 25, 5));
        assert_eq!(o.validation_fraction, 0.04);
        assert_eq!(o.lr_factor, 0.1);
    }

    #[test]
    fn test_rejects_single_input_model_for_multi_input() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = Trainer::new(ArtifactStore::open(dir.path()).unwrap());
        let mut net = NetworkSpec::single("s", 2, &[(2, ActivationFunction::Sigmoid)])
            .build(&mut StdRng::seed_from_u64(0))
            .unwrap();
        let x = vec![vec![0.0, 1.0]; 4];
        let y = vec![vec![0.0, 1.0]; 4];
        let options = TrainOptions { multi_input: true, ..small_options(1) };
        let err = trainer.train(&mut net, &x, &x, &y, &y, "s", &options).unwrap_err();
        assert!(matches!(err, HarnessError::ShapeMismatch(_)));
        // Nothing was written.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_rejects_test_features_of_wrong_width() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = Trainer::new(ArtifactStore::open(dir.path()).unwrap());
        let mut net = NetworkSpec::single("w", 2, &[(2, ActivationFunction::Sigmoid)])
            .build(&mut StdRng::seed_from_u64(0))
            .unwrap();
        let train_x = vec![vec![0.0, 1.0]; 8];
        let test_x = vec![vec![0.0, 1.0, 0.5]; 4];
        let train_y = vec![vec![0.0, 1.0]; 8];
        let test_y = vec![vec![0.0, 1.0]; 4];
        let err = trainer
            .train(&mut net, &train_x, &test_x, &train_y, &test_y, "w", &small_options(1))
            .unwrap_err();
        assert!(matches!(err, HarnessError::ShapeMismatch(_)));
    }

    #[test]
    fn test_without_validation_tail_keeps_trained_weights() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = Trainer::new(ArtifactStore::open(dir.path()).unwrap());
        let data = synthetic::blobs(128, 2, 9);
        let labels = to_categorical(data.labels(), 2).unwrap();
        let mut net = NetworkSpec::single("noval", 2, &[
            (4, ActivationFunction::Tanh),
            (2, ActivationFunction::Sigmoid),
        ])
        .build(&mut StdRng::seed_from_u64(1))
        .unwrap();
        let initial = net.snapshot();
        let options = TrainOptions { validation_fraction: 0.0, ..small_options(20) };

        let result = trainer
            .train(&mut net, data.features(), data.features(), &labels, &labels, "noval", &options)
            .unwrap();

        assert!(result.history.epochs.iter().all(|s| s.val_loss.is_none()));
        assert_ne!(net.snapshot(), initial);
        // The restored weights are those of the epoch with the lowest training loss.
        let best_loss = result.history.epochs.iter().map(|s| s.loss).fold(f64::INFINITY, f64::min);
        let first_loss = result.history.epochs[0].loss;
        assert!(best_loss < first_loss);
    }

    #[test]
    fn test_writes_checkpoint_and_restores_it() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = Trainer::new(ArtifactStore::open(dir.path()).unwrap());
        let data = synthetic::blobs(64, 2, 9);
        let labels = to_categorical(data.labels(), 2).unwrap();
        let mut net = NetworkSpec::single("blobs", 2, &[
            (4, ActivationFunction::Tanh),
            (2, ActivationFunction::Sigmoid),
        ])
        .build(&mut StdRng::seed_from_u64(1))
        .unwrap();

        let result = trainer
            .train(&mut net, data.features(), data.features(), &labels, &labels, "blobs", &small_options(10))
            .unwrap();

        assert_eq!(result.checkpoint, dir.path().join("blobs_0.json"));
        assert!(result.checkpoint.is_file());
        assert!((0.0..=1.0).contains(&result.accuracy));
        let on_disk = crate::network::model::Weights::load_json(&result.checkpoint).unwrap();
        assert_eq!(net.snapshot(), on_disk);
    }
}
