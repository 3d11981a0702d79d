use nalgebra::{DMatrix, DVector};

use crate::{Bounds, finite_difference};

/// A square nonlinear system `r(x) = 0` with optional box constraints.
///
/// A model owns its initial guess and its bounds. Solvers query both once,
/// then call [`residuals`](Model::residuals) and [`jacobian`](Model::jacobian)
/// repeatedly at trial states. Implementations should be pure: evaluating the
/// same state twice must give the same answer.
///
/// All vectors share one length `n`, the number of unknowns.
pub trait Model {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the initial guess for the unknowns.
    fn states(&self) -> DVector<f64>;

    /// Returns the box constraints on the unknowns.
    ///
    /// The default is unbounded in every component.
    fn bounds(&self) -> Bounds {
        Bounds::unbounded(self.states().len())
    }

    /// Evaluates the residual vector at `states`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the residuals cannot be computed.
    fn residuals(&self, states: &DVector<f64>) -> Result<DVector<f64>, Self::Error>;

    /// Evaluates the `n × n` Jacobian `∂r/∂x` at `states`.
    ///
    /// The default implementation approximates the Jacobian with
    /// [`finite_difference::jacobian`]. Override it when an analytic Jacobian
    /// is available.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if a residual evaluation fails.
    fn jacobian(&self, states: &DVector<f64>) -> Result<DMatrix<f64>, Self::Error> {
        finite_difference::jacobian(self, states)
    }
}
