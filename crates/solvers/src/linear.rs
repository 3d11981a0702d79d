//! Dense linear solves for the Newton system.
//!
//! A [`LinearSystem`] solves `A·x = b` once per call. Implementations must not
//! cache factorizations between calls: the matrix changes every iteration.

mod lu;

pub use lu::LuSolver;

use ipnewt_core::{DMatrix, DVector};
use thiserror::Error;

/// Solves a square dense linear system.
pub trait LinearSystem {
    /// Solves `matrix · x = rhs` for `x`.
    ///
    /// The matrix is taken by value so implementations can factorize in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SingularMatrix`] if the matrix is numerically singular,
    /// or another [`Error`] if the inputs are malformed.
    fn solve(&mut self, matrix: DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, Error>;
}

/// Errors that can occur during a linear solve.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum Error {
    #[error("matrix is singular: pivot {pivot:e} in column {column} is at or below {threshold:e}")]
    SingularMatrix {
        column: usize,
        pivot: f64,
        threshold: f64,
    },

    #[error("matrix is {rows}×{cols} but right-hand side has {rhs} entries")]
    Dimension { rows: usize, cols: usize, rhs: usize },

    #[error("matrix or right-hand side contains non-finite values")]
    NonFinite,
}

impl Error {
    /// Returns true if the matrix was numerically singular.
    ///
    /// Singularity is the only linear-solve failure that more regularization
    /// can fix.
    #[must_use]
    pub fn is_singular(&self) -> bool {
        matches!(self, Self::SingularMatrix { .. })
    }
}
