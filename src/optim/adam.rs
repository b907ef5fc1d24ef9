use crate::math::matrix::Matrix;

/// Adam optimizer with bias-corrected step size.
///
/// `lr_t = lr · sqrt(1 - β2^t) / (1 - β1^t)`, then
/// `θ -= lr_t · m / (sqrt(v) + ε)`.
///
/// Moment buffers are created on the first `step` from the parameter shapes.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    t: i32,
    m: Vec<Matrix>,
    v: Vec<Matrix>,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Adam {
        Adam::with_params(learning_rate, 0.9, 0.999, 1e-7)
    }

    pub fn with_params(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Adam {
        Adam { learning_rate, beta1, beta2, epsilon, t: 0, m: Vec::new(), v: Vec::new() }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, lr: f64) {
        self.learning_rate = lr;
    }

    pub fn iterations(&self) -> i32 {
        self.t
    }

    /// Applies one update; `grads[i]` must have the shape of `params[i]`.
    pub fn step(&mut self, params: &mut [&mut Matrix], grads: &[Matrix]) {
        assert_eq!(params.len(), grads.len(), "one gradient per parameter");
        if self.m.len() != params.len() {
            self.m = grads.iter().map(Matrix::zeros_like).collect();
            self.v = grads.iter().map(Matrix::zeros_like).collect();
        }
        self.t += 1;

        let (b1, b2) = (self.beta1, self.beta2);
        let lr_t = self.learning_rate * (1.0 - b2.powi(self.t)).sqrt() / (1.0 - b1.powi(self.t));

        for (i, (param, grad)) in params.iter_mut().zip(grads).enumerate() {
            let m = self.m[i].iter_mut();
            let v = self.v[i].iter_mut();
            for (((p, &g), m), v) in param.iter_mut().zip(grad.iter()).zip(m).zip(v) {
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                *p -= lr_t * *m / (v.sqrt() + self.epsilon);
            }
        }
    }
}
