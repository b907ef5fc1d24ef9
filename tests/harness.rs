use std::cell::RefCell;
use std::path::Path;

use ferrite_harness::data::synthetic;
use ferrite_harness::data::{to_categorical, Dataset};
use ferrite_harness::network::Weights;
use ferrite_harness::train::fit::validation_boundary;
use ferrite_harness::{
    ActivationFunction, ArtifactStore, CompileOptions, Compiled, ExperimentConfig,
    ExperimentOutcome, ExperimentRunner, HarnessError, Model, Network, NetworkSpec, Predictor,
    TrainOptions, Trainer,
};
use rand::{rngs::StdRng, SeedableRng};

/// Returns scripted accuracies and records the size of every test set.
struct ScriptedPredictor {
    accuracies: Vec<f64>,
    test_sizes: RefCell<Vec<usize>>,
}

impl ScriptedPredictor {
    fn new(accuracies: &[f64]) -> Self {
        ScriptedPredictor { accuracies: accuracies.to_vec(), test_sizes: RefCell::new(Vec::new()) }
    }
}

impl Predictor for ScriptedPredictor {
    fn predict_accuracy(
        &self,
        _model: &dyn Model,
        test_features: &[Vec<f64>],
        _test_labels: &[Vec<f64>],
        checkpoint: &Path,
        _multi_input: bool,
    ) -> ferrite_harness::Result<f64> {
        assert!(checkpoint.is_file());
        let mut sizes = self.test_sizes.borrow_mut();
        sizes.push(test_features.len());
        Ok(self.accuracies[sizes.len() - 1])
    }
}

fn small_net(seed: u64) -> Network {
    NetworkSpec::single("blobs", 2, &[
        (4, ActivationFunction::Tanh),
        (2, ActivationFunction::Sigmoid),
    ])
    .build(&mut StdRng::seed_from_u64(seed))
    .unwrap()
}

fn quick_config(run_name: &str) -> ExperimentConfig {
    ExperimentConfig {
        run_name: run_name.to_string(),
        epochs: 3,
        batch_size: 32,
        init_seed: Some(1),
        shuffle_seed: Some(2),
        ..ExperimentConfig::default()
    }
}

#[test]
fn test_kfold_two_folds_over_640_samples() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = ScriptedPredictor::new(&[0.8, 0.9]);
    let trainer = Trainer::with_predictor(ArtifactStore::open(dir.path()).unwrap(), predictor);
    let runner = ExperimentRunner::with_trainer(trainer);

    let dataset = synthetic::blobs(640, 2, 3);
    let config = ExperimentConfig { kfold: true, kfold_folds: 2, ..quick_config("cv") };
    let outcome = runner.run(&dataset, &mut small_net(0), &config).unwrap();

    let ExperimentOutcome::KFold(cv) = outcome else {
        panic!("expected a k-fold outcome");
    };
    assert_eq!(*runner.trainer().predictor().test_sizes.borrow(), vec![320, 320]);
    assert_eq!(cv.fold_accuracies, vec![0.8, 0.9]);
    assert!((cv.mean_accuracy - 0.85).abs() < 1e-12);
    assert_eq!(cv.best_fold, Some(1));

    let best = cv.best_artifact.unwrap();
    assert_eq!(best, dir.path().join("cv_best.json"));
    let promoted = Network::load_json(&best).unwrap();
    let second_fold = Weights::load_json(&cv.runs[1].checkpoint).unwrap();
    assert_eq!(promoted.snapshot(), second_fold);

    assert!(dir.path().join("cv_0.json").is_file());
    assert!(dir.path().join("cv_1.json").is_file());
}

#[test]
fn test_kfold_without_any_positive_fold_writes_no_best_model() {
    let dir = tempfile::tempdir().unwrap();
    let trainer = Trainer::with_predictor(
        ArtifactStore::open(dir.path()).unwrap(),
        ScriptedPredictor::new(&[0.0, 0.0, 0.0]),
    );
    let runner = ExperimentRunner::with_trainer(trainer);
    let config = ExperimentConfig { kfold: true, kfold_folds: 3, ..quick_config("zero") };

    let outcome = runner.run(&synthetic::blobs(60, 2, 4), &mut small_net(0), &config).unwrap();
    let ExperimentOutcome::KFold(cv) = outcome else {
        panic!("expected a k-fold outcome");
    };
    assert_eq!(cv.best_fold, None);
    assert_eq!(cv.mean_accuracy, 0.0);
    assert!(!dir.path().join("zero_best.json").exists());
}

#[test]
fn test_single_split_is_deterministic() {
    let run = || {
        let dir = tempfile::tempdir().unwrap();
        let predictor = ScriptedPredictor::new(&[0.5]);
        let trainer = Trainer::with_predictor(ArtifactStore::open(dir.path()).unwrap(), predictor);
        let runner = ExperimentRunner::with_trainer(trainer);
        let outcome = runner
            .run(&synthetic::blobs(100, 2, 5), &mut small_net(8), &quick_config("single"))
            .unwrap();
        let ExperimentOutcome::SingleSplit(result) = outcome else {
            panic!("expected a single-split outcome");
        };
        assert_eq!(result.checkpoint, dir.path().join("single_0.json"));
        let sizes = runner.trainer().predictor().test_sizes.borrow().clone();
        (Weights::load_json(&result.checkpoint).unwrap(), sizes)
    };

    let (first, sizes) = run();
    let (second, _) = run();
    assert_eq!(sizes, vec![20]);
    assert_eq!(first, second);
}

#[test]
fn test_restored_weights_have_lowest_validation_loss() {
    let dir = tempfile::tempdir().unwrap();
    let trainer = Trainer::new(ArtifactStore::open(dir.path()).unwrap());
    let data = synthetic::blobs(80, 2, 6);
    let labels = to_categorical(data.labels(), 2).unwrap();
    let options = TrainOptions {
        epochs: 30,
        validation_fraction: 0.25,
        batch_size: 8,
        shuffle_seed: Some(3),
        ..TrainOptions::default()
    };
    let mut net = small_net(2);

    let result = trainer
        .train(&mut net, data.features(), data.features(), &labels, &labels, "best", &options)
        .unwrap();

    let best = result.history.best_val_loss().unwrap().val_loss.unwrap();
    let split_at = validation_boundary(data.len(), options.validation_fraction);
    let compiled = Compiled::new(&CompileOptions::default());
    let (restored, _) = compiled.evaluate(&net, &data.features()[split_at..], &labels[split_at..], 1);
    assert!((restored - best).abs() < 1e-9, "restored {restored}, best {best}");
}

#[test]
fn test_label_outside_class_range_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ExperimentRunner::new(ArtifactStore::open(dir.path()).unwrap());
    let features = (0..20).map(|i| vec![i as f64 / 20.0, 0.5]).collect();
    let labels = (0..20).map(|i| i % 3).collect();
    let dataset = Dataset::new(features, labels).unwrap();

    let err = runner.run(&dataset, &mut small_net(0), &quick_config("bad")).unwrap_err();
    assert!(matches!(err, HarnessError::InvalidInput(_) | HarnessError::Dataset(_)));
}

#[test]
fn test_checkpoint_ids_continue_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("unrelated.txt"), "x").unwrap();
    let trainer = Trainer::with_predictor(
        ArtifactStore::open(dir.path()).unwrap(),
        ScriptedPredictor::new(&[0.1, 0.2]),
    );
    let runner = ExperimentRunner::with_trainer(trainer);
    let data = synthetic::blobs(50, 2, 7);

    for expected in ["twice_1.json", "twice_2.json"] {
        let outcome = runner.run(&data, &mut small_net(0), &quick_config("twice")).unwrap();
        let ExperimentOutcome::SingleSplit(result) = outcome else {
            panic!("expected a single-split outcome");
        };
        assert_eq!(result.checkpoint, dir.path().join(expected));
    }
}
