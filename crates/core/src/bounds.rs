use nalgebra::DVector;
use thiserror::Error;

/// Errors that can occur when constructing [`Bounds`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BoundsError {
    #[error("lower has {lower} entries but upper has {upper}")]
    LengthMismatch { lower: usize, upper: usize },

    #[error("bound for component {index} is NaN")]
    NaN { index: usize },

    #[error("lower bound for component {index} is not below its upper bound")]
    EmptyInterval { index: usize },
}

/// A component of a state vector that sits at or beyond one of its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Violation {
    pub index: usize,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Box constraints `lower[i] < x[i] < upper[i]` on a state vector.
///
/// Unbounded components use `f64::NEG_INFINITY` or `f64::INFINITY`.
/// Every component has a non-empty open interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    lower: DVector<f64>,
    upper: DVector<f64>,
}

impl Bounds {
    /// Creates validated bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the vectors differ in length, contain NaN, or any
    /// lower bound is not strictly below its upper bound.
    pub fn new(lower: DVector<f64>, upper: DVector<f64>) -> Result<Self, BoundsError> {
        if lower.len() != upper.len() {
            return Err(BoundsError::LengthMismatch {
                lower: lower.len(),
                upper: upper.len(),
            });
        }

        for (index, (lo, up)) in lower.iter().zip(upper.iter()).enumerate() {
            if lo.is_nan() || up.is_nan() {
                return Err(BoundsError::NaN { index });
            }
            if lo >= up {
                return Err(BoundsError::EmptyInterval { index });
            }
        }

        Ok(Self { lower, upper })
    }

    /// Creates bounds with no finite limits on any of the `n` components.
    #[must_use]
    pub fn unbounded(n: usize) -> Self {
        Self {
            lower: DVector::from_element(n, f64::NEG_INFINITY),
            upper: DVector::from_element(n, f64::INFINITY),
        }
    }

    /// Returns the number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lower.len()
    }

    /// Returns true if there are no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    #[must_use]
    pub fn lower(&self) -> &DVector<f64> {
        &self.lower
    }

    #[must_use]
    pub fn upper(&self) -> &DVector<f64> {
        &self.upper
    }

    /// Returns true if at least one component has a finite bound.
    #[must_use]
    pub fn has_finite(&self) -> bool {
        self.lower.iter().chain(self.upper.iter()).any(|b| b.is_finite())
    }

    /// Returns the first component at or beyond a bound, if any.
    ///
    /// Non-finite state values count as violations.
    #[must_use]
    pub fn violation(&self, states: &DVector<f64>) -> Option<Violation> {
        states
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .enumerate()
            .find(|&(_, (&x, (&lo, &up)))| !x.is_finite() || x <= lo || x >= up)
            .map(|(index, (&value, (&lower, &upper)))| Violation {
                index,
                value,
                lower,
                upper,
            })
    }

    /// Returns true if every component lies strictly inside its bounds.
    #[must_use]
    pub fn contains(&self, states: &DVector<f64>) -> bool {
        self.violation(states).is_none()
    }

    /// Returns the largest step along `direction` that keeps `states` inside.
    ///
    /// Each finite bound limits the step to `fraction` of the distance
    /// remaining to it, so the returned step never reaches a bound. Returns
    /// `f64::INFINITY` when no finite bound lies ahead.
    ///
    /// `states` must be strictly inside the bounds.
    #[must_use]
    pub fn max_step(&self, states: &DVector<f64>, direction: &DVector<f64>, fraction: f64) -> f64 {
        let mut step = f64::INFINITY;

        for i in 0..states.len() {
            let d = direction[i];
            let limit = if d < 0.0 && self.lower[i].is_finite() {
                (self.lower[i] - states[i]) / d
            } else if d > 0.0 && self.upper[i].is_finite() {
                (self.upper[i] - states[i]) / d
            } else {
                continue;
            };
            step = step.min(fraction * limit);
        }

        step
    }
}
