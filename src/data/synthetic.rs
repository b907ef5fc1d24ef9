//! Small generated datasets for demos and tests.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::data::dataset::Dataset;

/// Two Gaussian-ish blobs in `width` dimensions: class 0 centred at 0.3,
/// class 1 at 0.7 on every axis. Classes alternate by index.
pub fn blobs(n: usize, width: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let class = i % 2;
        let centre = if class == 0 { 0.3 } else { 0.7 };
        features.push((0..width).map(|_| centre + rng.gen_range(-0.12..0.12)).collect());
        labels.push(class);
    }
    Dataset::from_trusted(features, labels)
}

/// The four XOR points, repeated `copies` times.
pub fn xor(copies: usize) -> Dataset {
    let base = [([0.0, 0.0], 0), ([0.0, 1.0], 1), ([1.0, 0.0], 1), ([1.0, 1.0], 0)];
    let (features, labels): (Vec<Vec<f64>>, Vec<usize>) = (0..copies)
        .flat_map(|_| base.iter())
        .map(|(x, y)| (x.to_vec(), *y))
        .unzip();
    Dataset::from_trusted(features, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blobs_are_balanced_and_separable() {
        let ds = blobs(100, 3, 1);
        assert_eq!(ds.labels().iter().filter(|&&l| l == 1).count(), 50);
        for (x, &y) in ds.features().iter().zip(ds.labels()) {
            let mean = x.iter().sum::<f64>() / x.len() as f64;
            assert_eq!(mean > 0.5, y == 1);
        }
    }

    #[test]
    fn test_xor_size() {
        assert_eq!(xor(3).len(), 12);
    }
}
