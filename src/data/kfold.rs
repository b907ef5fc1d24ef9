use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::error::{HarnessError, Result};

/// One fold: indices to train on and indices to test on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// K-Fold cross-validation splitter.
///
/// Test sets are consecutive chunks of the (optionally shuffled) index list;
/// the first `n % k` chunks hold one extra sample.
#[derive(Clone, Debug)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    seed: u64,
}

impl KFold {
    /// Shuffled splitter with seed 42.
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: true,
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>> {
        if self.n_splits < 2 {
            return Err(HarnessError::invalid_input(format!(
                "k-fold needs at least 2 splits, got {}",
                self.n_splits
            )));
        }
        if self.n_splits > n_samples {
            return Err(HarnessError::invalid_input(format!(
                "cannot make {} folds from {n_samples} samples",
                self.n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            indices.shuffle(&mut StdRng::seed_from_u64(self.seed));
        }

        let fold_size = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;

        for i in 0..self.n_splits {
            let end = start + fold_size + usize::from(i < remainder);
            folds.push(Fold {
                test: indices[start..end].to_vec(),
                train: indices[..start].iter().chain(indices[end..].iter()).copied().collect(),
            });
            start = end;
        }

        Ok(folds)
    }
}
