use crate::error::{HarnessError, Result};

/// One-hot encodes integer labels into rows of width `classes`.
pub fn to_categorical(labels: &[usize], classes: usize) -> Result<Vec<Vec<f64>>> {
    if classes == 0 {
        return Err(HarnessError::invalid_input("class count must be positive"));
    }
    labels.iter()
        .map(|&label| {
            if label >= classes {
                return Err(HarnessError::invalid_input(format!(
                    "label {label} out of range for {classes} classes"
                )));
            }
            let mut row = vec![0.0; classes];
            row[label] = 1.0;
            Ok(row)
        })
        .collect()
}

/// Inverse of `to_categorical`: index of the largest entry in each row.
pub fn from_categorical(rows: &[Vec<f64>]) -> Vec<usize> {
    rows.iter().map(|r| argmax(r)).collect()
}

/// Index of the maximum element; the first one wins on ties.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_i, best), (i, &x)| {
            if x > best { (i, x) } else { (best_i, best) }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let labels = vec![0, 2, 1, 1, 0, 3];
        let encoded = to_categorical(&labels, 4).unwrap();
        assert!(encoded.iter().all(|r| r.len() == 4));
        assert_eq!(from_categorical(&encoded), labels);
    }

    #[test]
    fn test_rejects_out_of_range_label() {
        assert!(to_categorical(&[0, 2], 2).is_err());
    }

    #[test]
    fn test_argmax_first_on_ties() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
    }
}
