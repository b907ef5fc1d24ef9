use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::ops::{Add, Sub, Mul};

/// Row-major dense matrix. Layer weights are stored as (fan_in, fan_out) and
/// biases as (1, fan_out).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Matrix of zeros with the same shape as `other`.
    pub fn zeros_like(other: &Matrix) -> Matrix {
        Matrix::zeros(other.rows, other.cols)
    }

    /// Builds a one-row matrix from a slice.
    pub fn row(values: &[f64]) -> Matrix {
        Matrix { rows: 1, cols: values.len(), data: vec![values.to_vec()] }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        let cols = data.first().map(|r| r.len()).unwrap_or(0);
        Matrix { rows: data.len(), cols, data }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // (0, 1] on both draws keeps ln() finite.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Glorot-uniform initialization: U(-limit, limit) with
    /// `limit = sqrt(6 / (fan_in + fan_out))`, where `rows` is fan-in and
    /// `cols` is fan-out.
    pub fn glorot_uniform<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let limit = (6.0 / (rows + cols).max(1) as f64).sqrt();
        let data = (0..rows)
            .map(|_| (0..cols).map(|_| rng.gen_range(-limit..=limit)).collect())
            .collect();
        Matrix { rows, cols, data }
    }

    /// He initialization: N(0, sqrt(2 / fan_in)). Suited to ReLU layers.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let std_dev = (2.0 / rows.max(1) as f64).sqrt();
        let data = (0..rows)
            .map(|_| (0..cols).map(|_| Matrix::sample_standard_normal(rng) * std_dev).collect())
            .collect();
        Matrix { rows, cols, data }
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Element-wise `self += rhs`, used when summing per-sample gradients.
    pub fn add_assign(&mut self, rhs: &Matrix) {
        assert!(self.same_shape(rhs), "Matrices are of incorrect sizes");
        for (row, rhs_row) in self.data.iter_mut().zip(rhs.data.iter()) {
            for (x, y) in row.iter_mut().zip(rhs_row.iter()) {
                *x += y;
            }
        }
    }

    pub fn same_shape(&self, other: &Matrix) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    /// Iterates over every element in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.data.iter().flat_map(|row| row.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut f64> {
        self.data.iter_mut().flat_map(|row| row.iter_mut())
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(mut self, rhs: Self) -> Self::Output {
        self.add_assign(&rhs);
        self
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        if !self.same_shape(&rhs) {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, self.cols);

        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[i][j] = self.data[i][j] - rhs.data[i][j];
            }
        }

        res
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_multiply_row_by_weights() {
        let x = Matrix::row(&[1.0, 2.0]);
        let w = Matrix::from_data(vec![vec![1.0, 0.0, -1.0], vec![0.5, 1.0, 2.0]]);
        let z = x * w;
        assert_eq!(z.data, vec![vec![2.0, 2.0, 3.0]]);
    }

    #[test]
    fn test_glorot_uniform_is_bounded_and_seeded() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let m1 = Matrix::glorot_uniform(4, 2, &mut a);
        let m2 = Matrix::glorot_uniform(4, 2, &mut b);
        assert_eq!(m1, m2);
        let limit = (6.0f64 / 6.0).sqrt();
        assert!(m1.iter().all(|x| x.abs() <= limit));
    }

    #[test]
    fn test_add_assign_accumulates() {
        let mut acc = Matrix::zeros(1, 2);
        acc.add_assign(&Matrix::row(&[1.0, 2.0]));
        acc.add_assign(&Matrix::row(&[0.5, 0.5]));
        assert_eq!(acc.data, vec![vec![1.5, 2.5]]);
    }

    #[test]
    fn test_transpose_shape() {
        let m = Matrix::from_data(vec![vec![1.0, 2.0, 3.0]]);
        let t = m.transpose();
        assert_eq!((t.rows, t.cols), (3, 1));
        assert_eq!(t.data[2][0], 3.0);
    }
}
