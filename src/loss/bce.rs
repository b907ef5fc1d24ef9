/// Binary cross-entropy over independent outputs, averaged across the row.
pub struct BceLoss;

/// Probabilities are clipped to [EPS, 1 - EPS] before taking logs.
pub const EPS: f64 = 1e-7;

fn clip(p: f64) -> f64 {
    p.clamp(EPS, 1.0 - EPS)
}

impl BceLoss {
    /// Scalar BCE: -mean(y·ln(p) + (1-y)·ln(1-p))
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(&p, y)| {
                let p = clip(p);
                -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
            })
            .sum::<f64>() / n
    }

    /// ∂L/∂p per output: (p - y) / (p·(1 - p)·n)
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(&p, y)| {
                let p = clip(p);
                (p - y) / (p * (1.0 - p) * n)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_prediction_is_near_zero() {
        assert!(BceLoss::loss(&[1.0, 0.0], &[1.0, 0.0]) < 1e-6);
    }

    #[test]
    fn test_half_probability_is_ln2() {
        let l = BceLoss::loss(&[0.5, 0.5], &[1.0, 0.0]);
        assert!((l - std::f64::consts::LN_2).abs() < 1e-9);
    }

    #[test]
    fn test_derivative_sign() {
        let d = BceLoss::derivative(&[0.8, 0.3], &[1.0, 0.0]);
        assert!(d[0] < 0.0);
        assert!(d[1] > 0.0);
    }
}
