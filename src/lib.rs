pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod data;
pub mod harness;
pub mod config;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Dense;
pub use network::{Model, Network, NetworkSpec, Weights};
pub use loss::loss_type::LossType;
pub use optim::adam::Adam;
pub use train::{fit, CompileOptions, Compiled, FitConfig, History};
pub use data::Dataset;
pub use harness::{ArtifactStore, ExperimentOutcome, ExperimentRunner, Predictor, RunResult, TrainOptions, Trainer};
pub use config::{ExperimentConfig, HarnessConfig};
pub use error::{HarnessError, Result};
