use ipnewt_core::{DMatrix, DVector};

use super::{Error, LinearSystem};

/// LU factorization with partial pivoting.
///
/// A pivot counts as zero when its magnitude is at or below
/// `pivot_tol · max|Aᵢⱼ|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuSolver {
    pivot_tol: f64,
}

impl LuSolver {
    pub const DEFAULT_PIVOT_TOL: f64 = 1e-14;

    /// Creates a solver with a relative pivot tolerance.
    ///
    /// Negative or non-finite tolerances are replaced by the default.
    #[must_use]
    pub fn new(pivot_tol: f64) -> Self {
        let pivot_tol = if pivot_tol.is_finite() && pivot_tol >= 0.0 {
            pivot_tol
        } else {
            Self::DEFAULT_PIVOT_TOL
        };
        Self { pivot_tol }
    }

    #[must_use]
    pub fn pivot_tol(&self) -> f64 {
        self.pivot_tol
    }
}

impl Default for LuSolver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PIVOT_TOL)
    }
}

impl LinearSystem for LuSolver {
    fn solve(&mut self, matrix: DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, Error> {
        let (rows, cols) = matrix.shape();
        if rows != cols || rhs.len() != rows {
            return Err(Error::Dimension {
                rows,
                cols,
                rhs: rhs.len(),
            });
        }
        if matrix.iter().chain(rhs.iter()).any(|v| !v.is_finite()) {
            return Err(Error::NonFinite);
        }

        let threshold = self.pivot_tol * matrix.amax();
        let lu = matrix.lu();

        if let Some((column, &pivot)) = lu
            .u()
            .diagonal()
            .iter()
            .enumerate()
            .find(|&(_, p)| p.abs() <= threshold)
        {
            return Err(Error::SingularMatrix {
                column,
                pivot,
                threshold,
            });
        }

        lu.solve(rhs).ok_or(Error::SingularMatrix {
            column: 0,
            pivot: 0.0,
            threshold,
        })
    }
}
