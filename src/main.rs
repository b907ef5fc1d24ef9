use std::path::PathBuf;

use anyhow::{bail, Context};
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

use ferrite_harness::data::csv::load_csv;
use ferrite_harness::{ArtifactStore, ExperimentOutcome, ExperimentRunner, HarnessConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ferrite_harness=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(config_path), Some(data_path)) = (args.next(), args.next()) else {
        bail!("usage: ferrite-harness <config.json> <data.csv>");
    };
    let config_path = PathBuf::from(config_path);
    let data_path = PathBuf::from(data_path);

    let config = HarnessConfig::load_json(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let dataset = load_csv(&data_path)
        .with_context(|| format!("loading dataset {}", data_path.display()))?;
    tracing::info!(
        samples = dataset.len(),
        width = dataset.feature_width(),
        "loaded {}",
        data_path.display()
    );

    let mut rng = match config.network_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut network = config.network.build(&mut rng).context("building network")?;

    let artifacts = ArtifactStore::open(&config.artifact_dir)
        .with_context(|| format!("opening artifact directory {}", config.artifact_dir.display()))?;
    let runner = ExperimentRunner::new(artifacts);

    match runner.run(&dataset, &mut network, &config.experiment)? {
        ExperimentOutcome::SingleSplit(result) => {
            println!("Test accuracy: {:.6} ({})", result.accuracy, result.checkpoint.display());
        }
        ExperimentOutcome::KFold(cv) => {
            if let Some(path) = cv.best_artifact {
                println!("Best fold model: {}", path.display());
            }
        }
    }
    Ok(())
}
