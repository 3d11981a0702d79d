use std::convert::Infallible;

use ipnewt_core::{DMatrix, DVector, Model};
use nalgebra::dvector;

/// Powell's badly scaled function.
///
/// ```text
/// r₀ = 10⁴·x·y − 1
/// r₁ = e^(−x) + e^(−y) − 1.0001
/// ```
///
/// The root is near `(1.098e-5, 9.106)`. The default guess is `(0, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Powell {
    states: DVector<f64>,
}

impl Powell {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: dvector![0.0, 1.0],
        }
    }

    /// Replaces the initial guess.
    #[must_use]
    pub fn with_states(mut self, states: DVector<f64>) -> Self {
        self.states = states;
        self
    }
}

impl Default for Powell {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for Powell {
    type Error = Infallible;

    fn states(&self) -> DVector<f64> {
        self.states.clone()
    }

    fn residuals(&self, s: &DVector<f64>) -> Result<DVector<f64>, Self::Error> {
        Ok(dvector![
            1e4 * s[0] * s[1] - 1.0,
            (-s[0]).exp() + (-s[1]).exp() - 1.0001
        ])
    }

    fn jacobian(&self, s: &DVector<f64>) -> Result<DMatrix<f64>, Self::Error> {
        Ok(DMatrix::from_row_slice(
            2,
            2,
            &[1e4 * s[1], 1e4 * s[0], -(-s[0]).exp(), -(-s[1]).exp()],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ipnewt_core::finite_difference;

    #[test]
    fn residuals_vanish_near_known_root() {
        let root = dvector![1.098_159_329_699_988e-5, 9.106_146_739_864_842];
        let r = Powell::new().residuals(&root).unwrap();

        assert!(r.norm() < 1e-9, "residual norm {}", r.norm());
    }

    #[test]
    fn analytic_jacobian_matches_finite_differences() {
        let model = Powell::new();
        let states = dvector![0.3, 2.0];

        let analytic = model.jacobian(&states).unwrap();
        let approx = finite_difference::jacobian(&model, &states).unwrap();

        assert_relative_eq!(analytic, approx, max_relative = 1e-6, epsilon = 1e-6);
    }
}
