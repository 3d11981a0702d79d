use std::convert::Infallible;

use ipnewt_core::{Bounds, DVector, Model};
use nalgebra::dvector;

/// The Rosenbrock system.
///
/// ```text
/// r₀ = 10·(y − x²)
/// r₁ = 1 − x
/// ```
///
/// The only root is `(1, 1)`. No analytic Jacobian is provided, so solvers
/// fall back to [`finite_difference::jacobian`]. The default guess is
/// `(−1.2, 1)`.
///
/// [`finite_difference::jacobian`]: ipnewt_core::finite_difference::jacobian
#[derive(Debug, Clone, PartialEq)]
pub struct Rosenbrock {
    states: DVector<f64>,
    bounds: Bounds,
}

impl Rosenbrock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: dvector![-1.2, 1.0],
            bounds: Bounds::unbounded(2),
        }
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
}

impl Default for Rosenbrock {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for Rosenbrock {
    type Error = Infallible;

    fn states(&self) -> DVector<f64> {
        self.states.clone()
    }

    fn bounds(&self) -> Bounds {
        self.bounds.clone()
    }

    fn residuals(&self, s: &DVector<f64>) -> Result<DVector<f64>, Self::Error> {
        Ok(dvector![10.0 * (s[1] - s[0] * s[0]), 1.0 - s[0]])
    }
}
