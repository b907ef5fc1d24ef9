use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::data::dataset::Dataset;
use crate::error::{HarnessError, Result};

/// Shuffled hold-out split.
///
/// `ceil(test_fraction · n)` samples go to the test set, the rest to the
/// training set. The permutation depends only on `seed`.
pub fn train_test_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: u64,
) -> Result<(Dataset, Dataset)> {
    let (train_idx, test_idx) = split_indices(dataset.len(), test_fraction, seed)?;
    Ok((dataset.select(&train_idx), dataset.select(&test_idx)))
}

/// Index form of `train_test_split`: `(train, test)`.
pub fn split_indices(n_samples: usize, test_fraction: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(HarnessError::invalid_input(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    let n_test = (test_fraction * n_samples as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(HarnessError::invalid_input(format!(
            "cannot split {n_samples} samples with test fraction {test_fraction}"
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = indices.split_off(n_test);
    Ok((train, indices))
}
