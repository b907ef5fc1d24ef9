/// Categorical cross-entropy for a probability row (Softmax output).
pub struct CrossEntropyLoss;

const EPS: f64 = 1e-7;

impl CrossEntropyLoss {
    /// L = -Σ y_i · ln(p_i), with p clipped to [EPS, 1 - EPS].
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(&p, y)| -y * p.clamp(EPS, 1.0 - EPS).ln())
            .sum()
    }

    /// ∂L/∂p_i = -y_i / p_i. The Softmax layer applies its own Jacobian.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(&p, y)| -y / p.clamp(EPS, 1.0 - EPS))
            .collect()
    }
}
