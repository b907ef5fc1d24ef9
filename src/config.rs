//! File-backed configuration for the driver binary and the experiment runner.

use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

use crate::error::{HarnessError, Result};
use crate::network::spec::NetworkSpec;

/// Parameters of one experiment (single split or k-fold).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Prefix of every artifact written by the run.
    pub run_name: String,
    /// One-hot width used for the labels.
    pub classes: usize,
    /// Dataset size the model was designed for; logged at the start of a run.
    pub samples: usize,
    pub kfold: bool,
    pub kfold_folds: usize,
    /// Trailing fraction of each training set held out for validation.
    pub validation_fraction: f64,
    /// Feed the features to all three branches of a triple-branch model.
    pub multi_input: bool,
    /// Test share in single-split mode.
    pub test_fraction: f64,
    /// Seed for the train/test split and the fold assignment.
    pub seed: u64,
    /// Seed for parameter re-initialization between folds; `None` draws from entropy.
    pub init_seed: Option<u64>,
    /// Seed for the per-epoch shuffle; `None` draws from entropy.
    pub shuffle_seed: Option<u64>,
    pub epochs: usize,
    pub batch_size: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            run_name: "Noname".to_string(),
            classes: 2,
            samples: 640,
            kfold: false,
            kfold_folds: 2,
            validation_fraction: 0.04,
            multi_input: false,
            test_fraction: 0.2,
            seed: 42,
            init_seed: None,
            shuffle_seed: None,
            epochs: 100,
            batch_size: 64,
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.run_name.is_empty() {
            return Err(HarnessError::Config("run_name must not be empty".into()));
        }
        if self.classes == 0 {
            return Err(HarnessError::Config("classes must be at least 1".into()));
        }
        if self.kfold && self.kfold_folds < 2 {
            return Err(HarnessError::Config(format!(
                "kfold_folds must be at least 2, got {}",
                self.kfold_folds
            )));
        }
        if !(0.0..1.0).contains(&self.validation_fraction) {
            return Err(HarnessError::Config(format!(
                "validation_fraction must be in [0, 1), got {}",
                self.validation_fraction
            )));
        }
        if !self.kfold && !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(HarnessError::Config(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.epochs == 0 || self.batch_size == 0 {
            return Err(HarnessError::Config("epochs and batch_size must be positive".into()));
        }
        Ok(())
    }
}

/// Top-level configuration file read by the `ferrite-harness` binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Directory that receives checkpoints and best-of-run models.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
    #[serde(default)]
    pub experiment: ExperimentConfig,
    /// Architecture to build and train.
    pub network: NetworkSpec,
    /// Seed for the initial weights; `None` draws from entropy. Only affects
    /// single-split runs: k-fold re-initializes the model from
    /// `experiment.init_seed` before every fold, including the first.
    #[serde(default)]
    pub network_seed: Option<u64>,
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("./model")
}

impl HarnessConfig {
    pub fn load_json(path: &Path) -> Result<HarnessConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: HarnessConfig = serde_json::from_reader(reader)?;
        config.experiment.validate()?;
        config.network.validate()?;
        Ok(config)
    }
}
