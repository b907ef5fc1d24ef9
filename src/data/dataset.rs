use crate::error::{HarnessError, Result};

/// Feature vectors with one integer class label each.
///
/// Invariants checked at construction: as many labels as feature vectors,
/// and every feature vector has the same width.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl Dataset {
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Dataset> {
        if features.len() != labels.len() {
            return Err(HarnessError::dataset(format!(
                "{} feature vectors but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if let Some(first) = features.first() {
            let width = first.len();
            if let Some(row) = features.iter().position(|f| f.len() != width) {
                return Err(HarnessError::dataset(format!(
                    "row {row} has {} features, expected {width}",
                    features[row].len()
                )));
            }
        }
        Ok(Dataset { features, labels })
    }

    /// Skips validation; for generators whose shapes are consistent by construction.
    pub(crate) fn from_trusted(features: Vec<Vec<f64>>, labels: Vec<usize>) -> Dataset {
        debug_assert_eq!(features.len(), labels.len());
        Dataset { features, labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Width of each feature vector (0 for an empty dataset).
    pub fn feature_width(&self) -> usize {
        self.features.first().map(Vec::len).unwrap_or(0)
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Copies the rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    pub fn into_parts(self) -> (Vec<Vec<f64>>, Vec<usize>) {
        (self.features, self.labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_count_mismatch() {
        let err = Dataset::new(vec![vec![1.0]], vec![0, 1]).unwrap_err();
        assert!(matches!(err, HarnessError::Dataset(_)));
    }

    #[test]
    fn test_rejects_ragged_features() {
        assert!(Dataset::new(vec![vec![1.0, 2.0], vec![3.0]], vec![0, 1]).is_err());
    }

    #[test]
    fn test_select_keeps_pairs_together() {
        let ds = Dataset::new(vec![vec![0.0], vec![1.0], vec![2.0]], vec![0, 1, 0]).unwrap();
        let sub = ds.select(&[2, 1]);
        assert_eq!(sub.features(), &[vec![2.0], vec![1.0]]);
        assert_eq!(sub.labels(), &[0, 1]);
    }
}
