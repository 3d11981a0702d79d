use std::convert::Infallible;

use ipnewt_core::{Bounds, DMatrix, DVector, Model};
use nalgebra::dvector;

/// Two weakly coupled quadratics confined to the box `[0, 15]²`.
///
/// ```text
/// r₀ = x² − 2 + 0.1·y
/// r₁ = y² − 3 + 0.1·x
/// ```
///
/// The box excludes the roots with negative components, leaving the single
/// root near `(1.3531, 1.6925)`. The default guess `(14.9, 14.9)` sits close
/// to the upper corner.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedQuadratic {
    states: DVector<f64>,
}

impl BoundedQuadratic {
    pub const LOWER: f64 = 0.0;
    pub const UPPER: f64 = 15.0;

    #[must_use]
    pub fn new() -> Self {
        Self {
            states: dvector![14.9, 14.9],
        }
    }

    /// Replaces the initial guess.
    #[must_use]
    pub fn with_states(mut self, states: DVector<f64>) -> Self {
        self.states = states;
        self
    }
}

impl Default for BoundedQuadratic {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for BoundedQuadratic {
    type Error = Infallible;

    fn states(&self) -> DVector<f64> {
        self.states.clone()
    }

    fn bounds(&self) -> Bounds {
        // Known-good values, unwrap is safe
        Bounds::new(
            DVector::from_element(2, Self::LOWER),
            DVector::from_element(2, Self::UPPER),
        )
        .unwrap()
    }

    fn residuals(&self, s: &DVector<f64>) -> Result<DVector<f64>, Self::Error> {
        Ok(dvector![
            s[0] * s[0] - 2.0 + 0.1 * s[1],
            s[1] * s[1] - 3.0 + 0.1 * s[0]
        ])
    }

    fn jacobian(&self, s: &DVector<f64>) -> Result<DMatrix<f64>, Self::Error> {
        Ok(DMatrix::from_row_slice(
            2,
            2,
            &[2.0 * s[0], 0.1, 0.1, 2.0 * s[1]],
        ))
    }
}
