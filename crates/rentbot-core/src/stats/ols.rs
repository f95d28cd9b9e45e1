use crate::stats::fiterror::{FitError, FitResult};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Singular values below this fraction of the largest one count as zero.
const RCOND: f64 = 1e-10;

/// Ordinary least squares with an intercept, over any number of features.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ols {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl fmt::Display for Ols {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ols(intercept: {:.3}, coefficients: {:?})", self.intercept, self.coefficients)
    }
}

impl Ols {
    pub fn from_coeffs(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self { intercept, coefficients }
    }

    pub fn calculate(&self, x: &[f64]) -> f64 {
        self.intercept + self.coefficients.iter().zip(x).map(|(c, v)| c * v).sum::<f64>()
    }

    /// Fit `y ~ intercept + x · coefficients`.
    ///
    /// Columns and target are centred first and the centred system is solved
    /// through SVD, treating singular values under a relative tolerance as zero.
    /// Rank deficient inputs therefore get the minimum-norm solution instead of
    /// an error, and the result is fully determined by the data.
    pub fn train(x: &[Vec<f64>], y: &[f64]) -> FitResult<Self> {
        if x.len() != y.len() {
            return Err(FitError::LengthMismatch { rows: x.len(), targets: y.len() });
        }
        if x.is_empty() {
            return Err(FitError::NotEnoughPoints { len: 0, needed: 1 });
        }

        let n = x.len();
        let p = x[0].len();
        for (i, row) in x.iter().enumerate() {
            if row.len() != p {
                return Err(FitError::RaggedRow { row: i, len: row.len(), expected: p });
            }
        }
        if x.iter().flatten().chain(y).any(|v| !v.is_finite()) {
            return Err(FitError::NonFiniteInput);
        }

        let flat: Vec<f64> = x.iter().flatten().copied().collect();
        let mut a = DMatrix::from_row_slice(n, p, &flat);
        let mut b = DVector::from_column_slice(y);

        let x_means: Vec<f64> = a.column_iter().map(|c| c.mean()).collect();
        let y_mean = b.mean();
        for (mut col, m) in a.column_iter_mut().zip(&x_means) {
            col.add_scalar_mut(-m);
        }
        b.add_scalar_mut(-y_mean);

        // no variance left in any column: only the intercept carries signal
        let coefficients = if a.iter().all(|v| *v == 0.0) {
            vec![0.0; p]
        } else {
            let svd = a.svd(true, true);
            let max_sv = svd.singular_values.max();
            let eps = max_sv * RCOND.max(n.max(p) as f64 * f64::EPSILON);
            let w = svd.solve(&b, eps).map_err(FitError::Solver)?;
            w.iter().copied().collect()
        };

        let intercept =
            y_mean - coefficients.iter().zip(&x_means).map(|(c, m)| c * m).sum::<f64>();

        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(FitError::Solver("non-finite coefficients"));
        }

        Ok(Self { intercept, coefficients })
    }
}
