use std::fmt;
use std::path::PathBuf;

use rand::{rngs::StdRng, SeedableRng};

use crate::config::ExperimentConfig;
use crate::data::dataset::Dataset;
use crate::data::encoding::to_categorical;
use crate::data::kfold::KFold;
use crate::data::split::train_test_split;
use crate::error::{HarnessError, Result};
use crate::harness::artifacts::ArtifactStore;
use crate::harness::predictor::{ArgmaxAccuracy, Predictor};
use crate::harness::trainer::{RunResult, TrainOptions, Trainer};
use crate::network::model::Model;

/// Where a run currently is; only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Splitting,
    Training,
    Scoring,
    Aggregating,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Splitting => "splitting",
            Phase::Training => "training",
            Phase::Scoring => "scoring",
            Phase::Aggregating => "aggregating",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of `ExperimentRunner::run`.
#[derive(Debug, Clone)]
pub enum ExperimentOutcome {
    SingleSplit(RunResult),
    KFold(CrossValidation),
}

/// Aggregated k-fold result.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    /// Test accuracy of every fold, in fold order.
    pub fold_accuracies: Vec<f64>,
    pub mean_accuracy: f64,
    /// Index of the fold whose model was promoted, if any fold beat 0.0.
    pub best_fold: Option<usize>,
    pub best_artifact: Option<PathBuf>,
    pub runs: Vec<RunResult>,
}

/// Drives the `Trainer` over a single hold-out split or over k folds.
pub struct ExperimentRunner<P: Predictor = ArgmaxAccuracy> {
    trainer: Trainer<P>,
}

impl ExperimentRunner<ArgmaxAccuracy> {
    pub fn new(artifacts: ArtifactStore) -> Self {
        ExperimentRunner { trainer: Trainer::new(artifacts) }
    }
}

impl<P: Predictor> ExperimentRunner<P> {
    pub fn with_trainer(trainer: Trainer<P>) -> Self {
        ExperimentRunner { trainer }
    }

    pub fn trainer(&self) -> &Trainer<P> {
        &self.trainer
    }

    /// Runs the experiment described by `config` on `dataset`.
    ///
    /// Any error aborts the whole run; no partial mean is reported.
    pub fn run(
        &self,
        dataset: &Dataset,
        model: &mut dyn Model,
        config: &ExperimentConfig,
    ) -> Result<ExperimentOutcome> {
        config.validate()?;
        if dataset.is_empty() {
            return Err(HarnessError::dataset("dataset is empty"));
        }
        if dataset.len() != config.samples {
            tracing::warn!(
                samples = dataset.len(),
                expected = config.samples,
                "dataset size differs from the configured sample count"
            );
        }
        tracing::info!(
            run = %config.run_name,
            samples = dataset.len(),
            expected_samples = config.samples,
            classes = config.classes,
            kfold = config.kfold,
            "starting experiment"
        );

        let outcome = if config.kfold {
            ExperimentOutcome::KFold(self.cross_validate(dataset, model, config)?)
        } else {
            ExperimentOutcome::SingleSplit(self.single_split(dataset, model, config)?)
        };
        tracing::debug!(phase = %Phase::Done, run = %config.run_name);
        Ok(outcome)
    }

    fn single_split(
        &self,
        dataset: &Dataset,
        model: &mut dyn Model,
        config: &ExperimentConfig,
    ) -> Result<RunResult> {
        tracing::debug!(phase = %Phase::Splitting, test_fraction = config.test_fraction);
        let (train, test) = train_test_split(dataset, config.test_fraction, config.seed)?;
        let train_labels = to_categorical(train.labels(), config.classes)?;
        let test_labels = to_categorical(test.labels(), config.classes)?;

        tracing::debug!(phase = %Phase::Training, train = train.len(), test = test.len());
        let result = self.trainer.train(
            model,
            train.features(),
            test.features(),
            &train_labels,
            &test_labels,
            &config.run_name,
            &train_options(config),
        )?;
        tracing::info!(run = %config.run_name, accuracy = result.accuracy, "single split finished");
        Ok(result)
    }

    fn cross_validate(
        &self,
        dataset: &Dataset,
        model: &mut dyn Model,
        config: &ExperimentConfig,
    ) -> Result<CrossValidation> {
        tracing::debug!(phase = %Phase::Splitting, folds = config.kfold_folds);
        let folds = KFold::new(config.kfold_folds)
            .with_seed(config.seed)
            .split(dataset.len())?;

        let mut init_rng = match config.init_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let options = train_options(config);
        let best_path = self.trainer.artifacts().best_path(&config.run_name);

        let mut best_accuracy = 0.0;
        let mut best_fold = None;
        let mut fold_accuracies = Vec::with_capacity(folds.len());
        let mut runs = Vec::with_capacity(folds.len());

        for (k, fold) in folds.iter().enumerate() {
            tracing::debug!(phase = %Phase::Training, fold = k, train = fold.train.len(), test = fold.test.len());
            model.reset_parameters(&mut init_rng);

            let train = dataset.select(&fold.train);
            let test = dataset.select(&fold.test);
            let train_labels = to_categorical(train.labels(), config.classes)?;
            let test_labels = to_categorical(test.labels(), config.classes)?;

            let result = self.trainer.train(
                model,
                train.features(),
                test.features(),
                &train_labels,
                &test_labels,
                &config.run_name,
                &options,
            )?;

            tracing::debug!(phase = %Phase::Scoring, fold = k);
            tracing::info!(fold = k, accuracy = result.accuracy, "fold finished");
            if result.accuracy > best_accuracy {
                best_accuracy = result.accuracy;
                best_fold = Some(k);
                model.save(&best_path)?;
                tracing::info!(fold = k, path = %best_path.display(), "new best fold saved");
            }
            fold_accuracies.push(result.accuracy);
            runs.push(result);
        }

        tracing::debug!(phase = %Phase::Aggregating);
        let mean_accuracy = mean(&fold_accuracies);
        println!("Average classification accuracy for {} : {:.6}", config.run_name, mean_accuracy);
        tracing::info!(run = %config.run_name, mean_accuracy, best_fold = ?best_fold, "cross-validation finished");

        Ok(CrossValidation {
            fold_accuracies,
            mean_accuracy,
            best_fold,
            best_artifact: best_fold.map(|_| best_path),
            runs,
        })
    }
}

fn train_options(config: &ExperimentConfig) -> TrainOptions {
    TrainOptions {
        epochs: config.epochs,
        validation_fraction: config.validation_fraction,
        multi_input: config.multi_input,
        batch_size: config.batch_size,
        shuffle_seed: config.shuffle_seed,
        ..TrainOptions::default()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_fold_accuracies() {
        assert!((mean(&[0.8, 0.9]) - 0.85).abs() < 1e-12);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_train_options_follow_experiment() {
        let config = ExperimentConfig {
            epochs: 7,
            multi_input: true,
            validation_fraction: 0.1,
            ..ExperimentConfig::default()
        };
        let o = train_options(&config);
        assert_eq!(o.epochs, 7);
        assert!(o.multi_input);
        assert_eq!(o.validation_fraction, 0.1);
        assert_eq!(o.early_stopping_patience, 25);
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::Aggregating.to_string(), "aggregating");
    }
}
