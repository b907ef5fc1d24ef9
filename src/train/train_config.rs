use serde::{Serialize, Deserialize};

/// Settings for one `fit` call.
///
/// # Fields
/// - `epochs`          : upper bound on full passes over the training data
/// - `batch_size`      : samples per gradient step
/// - `shuffle`         : reshuffle the training samples every epoch
/// - `validation_split`: trailing fraction of the samples held out for
///                        validation, taken before any shuffling
/// - `input_copies`    : how many input branches receive the same feature
///                        vector (1 for single-input models)
/// - `seed`            : seeds the per-epoch shuffle; `None` draws from entropy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub shuffle: bool,
    pub validation_split: f64,
    pub input_copies: usize,
    pub seed: Option<u64>,
}

impl FitConfig {
    /// Shuffling, no validation split, one input branch.
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        FitConfig {
            epochs,
            batch_size,
            shuffle: true,
            validation_split: 0.0,
            input_copies: 1,
            seed: None,
        }
    }
}
