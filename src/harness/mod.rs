//! Experiment layer: artifact naming, checkpointed training runs, scoring
//! and k-fold cross-validation.

pub mod artifacts;
pub mod predictor;
pub mod runner;
pub mod trainer;

pub use artifacts::ArtifactStore;
pub use predictor::{ArgmaxAccuracy, Predictor};
pub use runner::{CrossValidation, ExperimentOutcome, ExperimentRunner};
pub use trainer::{RunResult, TrainOptions, Trainer};
