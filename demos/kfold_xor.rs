use ferrite_harness::data::synthetic;
use ferrite_harness::{
    ActivationFunction, ArtifactStore, ExperimentConfig, ExperimentOutcome, ExperimentRunner,
    NetworkSpec,
};
use rand::{rngs::StdRng, SeedableRng};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("ferrite_harness=info").init();

    let dataset = synthetic::xor(40);
    let spec = NetworkSpec::triple_branch(
        "xor",
        2,
        &[(4, ActivationFunction::Tanh)],
        &[(8, ActivationFunction::ReLU), (2, ActivationFunction::Sigmoid)],
    );
    let mut network = spec.build(&mut StdRng::seed_from_u64(7))?;

    let dir = std::env::temp_dir().join("ferrite-harness-xor");
    let runner = ExperimentRunner::new(ArtifactStore::open(&dir)?);
    let config = ExperimentConfig {
        run_name: "xor".to_string(),
        kfold: true,
        kfold_folds: 4,
        multi_input: true,
        validation_fraction: 0.1,
        epochs: 200,
        batch_size: 16,
        init_seed: Some(7),
        ..ExperimentConfig::default()
    };

    if let ExperimentOutcome::KFold(cv) = runner.run(&dataset, &mut network, &config)? {
        for (k, acc) in cv.fold_accuracies.iter().enumerate() {
            println!("Fold {k}: {acc:.4}");
        }
        if let Some(path) = cv.best_artifact {
            println!("Best model written to {}", path.display());
        }
    }
    Ok(())
}
