use std::convert::Infallible;

use ipnewt_core::{Bounds, DMatrix, DVector, Model};
use thiserror::Error;

/// Errors that can occur when constructing a [`Linear`] system.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LinearError {
    #[error("matrix is {rows}×{cols}, expected square")]
    NotSquare { rows: usize, cols: usize },

    #[error("right-hand side has {len} entries, expected {expected}")]
    RhsLength { len: usize, expected: usize },
}

/// The affine system `r(x) = A·x − b`.
///
/// The Jacobian is `A` everywhere. The default guess is the zero vector and
/// the default bounds are unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    a: DMatrix<f64>,
    b: DVector<f64>,
    states: DVector<f64>,
    bounds: Bounds,
}

impl Linear {
    /// Creates the system from a square matrix and a right-hand side.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` is not square or `b` does not match its size.
    pub fn new(a: DMatrix<f64>, b: DVector<f64>) -> Result<Self, LinearError> {
        let (rows, cols) = a.shape();
        if rows != cols {
            return Err(LinearError::NotSquare { rows, cols });
        }
        if b.len() != rows {
            return Err(LinearError::RhsLength {
                len: b.len(),
                expected: rows,
            });
        }

        Ok(Self {
            a,
            b,
            states: DVector::zeros(rows),
            bounds: Bounds::unbounded(rows),
        })
    }

    /// Replaces the initial guess.
    #[must_use]
    pub fn with_states(mut self, states: DVector<f64>) -> Self {
        self.states = states;
        self
    }

    /// Replaces the bounds.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Returns the exact root `A⁻¹·b`, if `A` is invertible.
    #[must_use]
    pub fn root(&self) -> Option<DVector<f64>> {
        self.a.clone().lu().solve(&self.b)
    }
}

impl Model for Linear {
    type Error = Infallible;

    fn states(&self) -> DVector<f64> {
        self.states.clone()
    }

    fn bounds(&self) -> Bounds {
        self.bounds.clone()
    }

    fn residuals(&self, states: &DVector<f64>) -> Result<DVector<f64>, Self::Error> {
        Ok(&self.a * states - &self.b)
    }

    fn jacobian(&self, _states: &DVector<f64>) -> Result<DMatrix<f64>, Self::Error> {
        Ok(self.a.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, dvector};

    #[test]
    fn rejects_bad_shapes() {
        let not_square = Linear::new(DMatrix::zeros(2, 3), dvector![1.0, 2.0]);
        assert_eq!(
            not_square,
            Err(LinearError::NotSquare { rows: 2, cols: 3 })
        );

        let short_rhs = Linear::new(DMatrix::identity(2, 2), dvector![1.0]);
        assert_eq!(
            short_rhs,
            Err(LinearError::RhsLength {
                len: 1,
                expected: 2
            })
        );
    }

    #[test]
    fn residual_is_zero_at_root() {
        let model = Linear::new(dmatrix![3.0, 1.0; 1.0, 2.0], dvector![9.0, 8.0]).unwrap();
        let root = model.root().expect("invertible");

        assert_relative_eq!(root, dvector![2.0, 3.0], epsilon = 1e-12);
        assert_relative_eq!(
            model.residuals(&root).unwrap(),
            dvector![0.0, 0.0],
            epsilon = 1e-12
        );
    }
}
