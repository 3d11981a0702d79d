//! Interior penalty terms that keep states strictly inside their bounds.
//!
//! Each finite bound contributes a reciprocal barrier, the gradient of a log
//! barrier, to the residual of its component:
//!
//! ```text
//! lower:  rᵢ += −μˡᵢ / (xᵢ − lᵢ)      Jᵢᵢ += μˡᵢ / (xᵢ − lᵢ)²
//! upper:  rᵢ +=  μᵘᵢ / (uᵢ − xᵢ)      Jᵢᵢ += μᵘᵢ / (uᵢ − xᵢ)²
//! ```
//!
//! Both terms push `xᵢ` away from the bound they belong to and vanish as
//! `μ → 0`. Infinite bounds contribute nothing.
//!
//! The signs above hold for a component whose residual increases with its
//! state. When `Jᵢᵢ < 0` both terms are negated, so the barrier still pushes
//! inward and the diagonal grows in magnitude instead of cancelling.

use ipnewt_core::{Bounds, DMatrix, DVector};
use thiserror::Error;

/// Configuration for the penalty weights.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawConfig"))]
pub struct Config {
    mu_init: f64,
    decay: f64,
    floor: f64,
}

/// Errors that can occur when validating a penalty config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("mu_init must be finite and non-negative")]
    MuInit,

    #[error("decay must be in (0, 1]")]
    Decay,

    #[error("floor must be finite, non-negative and at most mu_init")]
    Floor,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1e-2, 0.1, 0.0).unwrap()
    }
}

impl Config {
    /// Creates a new validated config.
    ///
    /// # Errors
    ///
    /// Returns an error if `mu_init` or `floor` is negative or non-finite,
    /// if `floor > mu_init`, or if `decay` is outside `(0, 1]`.
    pub fn new(mu_init: f64, decay: f64, floor: f64) -> Result<Self, ConfigError> {
        if !mu_init.is_finite() || mu_init < 0.0 {
            return Err(ConfigError::MuInit);
        }
        if !(decay > 0.0 && decay <= 1.0) {
            return Err(ConfigError::Decay);
        }
        if !floor.is_finite() || floor < 0.0 || floor > mu_init {
            return Err(ConfigError::Floor);
        }

        Ok(Self {
            mu_init,
            decay,
            floor,
        })
    }

    /// Returns a config with all penalty weights zero.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            mu_init: 0.0,
            decay: 1.0,
            floor: 0.0,
        }
    }

    /// Returns the initial weight for every finite bound.
    #[must_use]
    pub fn mu_init(&self) -> f64 {
        self.mu_init
    }

    /// Returns the factor applied to each weight per iteration.
    #[must_use]
    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Returns the smallest weight a positive weight decays to.
    #[must_use]
    pub fn floor(&self) -> f64 {
        self.floor
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    mu_init: f64,
    decay: f64,
    floor: f64,
}

#[cfg(feature = "serde")]
impl Default for RawConfig {
    fn default() -> Self {
        let config = Config::default();
        Self {
            mu_init: config.mu_init,
            decay: config.decay,
            floor: config.floor,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        Self::new(raw.mu_init, raw.decay, raw.floor)
    }
}

/// Current penalty weights, one per bound per component.
///
/// Weights are zero for infinite bounds and never negative.
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltyState {
    mu_lower: DVector<f64>,
    mu_upper: DVector<f64>,
}

impl PenaltyState {
    #[must_use]
    pub fn mu_lower(&self) -> &DVector<f64> {
        &self.mu_lower
    }

    #[must_use]
    pub fn mu_upper(&self) -> &DVector<f64> {
        &self.mu_upper
    }
}

/// Barrier contributions at one state.
#[derive(Debug, Clone, PartialEq)]
pub struct Terms {
    /// Added to the residual vector.
    pub residual: DVector<f64>,

    /// Added to the Jacobian diagonal.
    pub diagonal: DVector<f64>,
}

/// Applies interior penalty terms for a fixed set of bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltyBounds {
    bounds: Bounds,
    config: Config,
    state: PenaltyState,
}

impl PenaltyBounds {
    /// Creates a handler with `mu_init` on every finite bound.
    #[must_use]
    pub fn new(bounds: Bounds, config: Config) -> Self {
        let weight = |b: &f64| if b.is_finite() { config.mu_init() } else { 0.0 };
        let state = PenaltyState {
            mu_lower: bounds.lower().map(|b| weight(&b)),
            mu_upper: bounds.upper().map(|b| weight(&b)),
        };

        Self {
            bounds,
            config,
            state,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &PenaltyState {
        &self.state
    }

    /// Returns `true` while any weight is positive.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.mu_lower.iter().chain(self.state.mu_upper.iter()).any(|&mu| mu > 0.0)
    }

    /// Computes the barrier terms at `states`.
    ///
    /// `states` must be strictly inside the bounds. Each component's terms
    /// take the sign of `jacobian_diagonal[i]`, with zero treated as positive.
    #[must_use]
    pub fn terms(&self, states: &DVector<f64>, jacobian_diagonal: &DVector<f64>) -> Terms {
        let n = states.len();
        let mut residual = DVector::zeros(n);
        let mut diagonal = DVector::zeros(n);

        for i in 0..n {
            let x = states[i];
            let sign = if jacobian_diagonal[i] < 0.0 { -1.0 } else { 1.0 };

            let lower = self.bounds.lower()[i];
            if lower.is_finite() {
                let gap = x - lower;
                let mu = self.state.mu_lower[i];
                residual[i] -= sign * mu / gap;
                diagonal[i] += sign * mu / (gap * gap);
            }

            let upper = self.bounds.upper()[i];
            if upper.is_finite() {
                let gap = upper - x;
                let mu = self.state.mu_upper[i];
                residual[i] += sign * mu / gap;
                diagonal[i] += sign * mu / (gap * gap);
            }
        }

        Terms { residual, diagonal }
    }

    /// Adds the barrier terms at `states` to `residuals` and `jacobian`.
    pub fn augment(
        &self,
        states: &DVector<f64>,
        residuals: &mut DVector<f64>,
        jacobian: &mut DMatrix<f64>,
    ) {
        let current = jacobian.diagonal();
        let Terms { residual, diagonal } = self.terms(states, &current);
        *residuals += residual;
        let diagonal = current + diagonal;
        jacobian.set_diagonal(&diagonal);
    }

    /// Decays every weight one step: `μ ← max(μ · decay, floor)`.
    ///
    /// Zero weights stay zero.
    pub fn decay(&mut self) {
        let Config { decay, floor, .. } = self.config;
        let step = |mu: f64| if mu > 0.0 { (mu * decay).max(floor) } else { 0.0 };

        self.state.mu_lower.apply(|mu| *mu = step(*mu));
        self.state.mu_upper.apply(|mu| *mu = step(*mu));
    }

    /// Sets every weight to zero for the rest of the solve.
    ///
    /// Used when the barrier-augmented step stalls near a bound and the model
    /// residual can no longer be reduced along it.
    pub fn release(&mut self) {
        self.state.mu_lower.fill(0.0);
        self.state.mu_upper.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, dvector};

    fn mixed_bounds() -> Bounds {
        // Two-sided, lower only, unbounded.
        Bounds::new(
            dvector![0.0, 1.0, f64::NEG_INFINITY],
            dvector![4.0, f64::INFINITY, f64::INFINITY],
        )
        .expect("valid bounds")
    }

    #[test]
    fn initial_weights_follow_finite_bounds() {
        let penalty = PenaltyBounds::new(mixed_bounds(), Config::default());

        assert_relative_eq!(penalty.state().mu_lower(), &dvector![1e-2, 1e-2, 0.0]);
        assert_relative_eq!(penalty.state().mu_upper(), &dvector![1e-2, 0.0, 0.0]);
    }

    #[test]
    fn barrier_terms_push_away_from_bounds() {
        let config = Config::new(1.0, 0.1, 0.0).expect("valid");
        let penalty = PenaltyBounds::new(mixed_bounds(), config);

        let terms = penalty.terms(&dvector![1.0, 3.0, -7.0], &dvector![1.0, 0.0, 2.0]);

        // x₀ = 1: −1/1 + 1/3; x₁ = 3: −1/2; x₂ unbounded.
        assert_relative_eq!(terms.residual, dvector![-1.0 + 1.0 / 3.0, -0.5, 0.0]);
        assert_relative_eq!(terms.diagonal, dvector![1.0 + 1.0 / 9.0, 0.25, 0.0]);
    }

    #[test]
    fn barrier_terms_follow_decreasing_residuals() {
        let config = Config::new(1.0, 0.1, 0.0).expect("valid");
        let penalty = PenaltyBounds::new(mixed_bounds(), config);

        let terms = penalty.terms(&dvector![1.0, 3.0, -7.0], &dvector![-1.0, 1.0, -2.0]);

        assert_relative_eq!(terms.residual, dvector![1.0 - 1.0 / 3.0, -0.5, 0.0]);
        assert_relative_eq!(terms.diagonal, dvector![-1.0 - 1.0 / 9.0, 0.25, 0.0]);
    }

    #[test]
    fn augment_touches_only_the_diagonal() {
        let config = Config::new(1.0, 0.1, 0.0).expect("valid");
        let bounds = Bounds::new(dvector![0.0, f64::NEG_INFINITY], dvector![f64::INFINITY, 2.0])
            .expect("valid bounds");
        let penalty = PenaltyBounds::new(bounds, config);

        let mut residuals = dvector![10.0, 20.0];
        let mut jacobian = dmatrix![1.0, 2.0; 3.0, 4.0];
        penalty.augment(&dvector![0.5, 1.5], &mut residuals, &mut jacobian);

        assert_relative_eq!(residuals, dvector![8.0, 22.0]);
        assert_relative_eq!(jacobian, dmatrix![5.0, 2.0; 3.0, 8.0]);

        // Negated model: the step direction is unchanged.
        let mut residuals = dvector![-10.0, -20.0];
        let mut jacobian = dmatrix![-1.0, -2.0; -3.0, -4.0];
        penalty.augment(&dvector![0.5, 1.5], &mut residuals, &mut jacobian);

        assert_relative_eq!(residuals, dvector![-8.0, -22.0]);
        assert_relative_eq!(jacobian, dmatrix![-5.0, -2.0; -3.0, -8.0]);
    }

    #[test]
    fn weights_decay_geometrically_to_floor() {
        let config = Config::new(1e-2, 0.1, 1e-5).expect("valid");
        let mut penalty = PenaltyBounds::new(mixed_bounds(), config);

        let mut expected = 1e-2;
        for _ in 0..6 {
            penalty.decay();
            expected = (expected * 0.1_f64).max(1e-5);
            assert_relative_eq!(penalty.state().mu_lower()[0], expected);
            assert_relative_eq!(penalty.state().mu_upper()[0], expected);
        }
        assert_relative_eq!(penalty.state().mu_lower()[0], 1e-5);

        // Unbounded components stay at zero, never at the floor.
        assert_relative_eq!(penalty.state().mu_lower()[2], 0.0);
        assert_relative_eq!(penalty.state().mu_upper()[1], 0.0);
    }

    #[test]
    fn default_weights_vanish() {
        let mut penalty = PenaltyBounds::new(mixed_bounds(), Config::default());
        for _ in 0..400 {
            penalty.decay();
        }
        assert!(!penalty.is_active());
    }

    #[test]
    fn release_zeroes_every_weight() {
        let mut penalty = PenaltyBounds::new(mixed_bounds(), Config::default());
        assert!(penalty.is_active());

        penalty.release();
        assert!(!penalty.is_active());

        let terms = penalty.terms(&dvector![1e-9, 1.0 + 1e-9, 0.0], &dvector![1.0, 1.0, 1.0]);
        assert_relative_eq!(terms.residual, DVector::zeros(3));

        penalty.decay();
        assert_relative_eq!(penalty.state().mu_lower(), &DVector::zeros(3));
    }

    #[test]
    fn disabled_penalty_has_no_effect() {
        let penalty = PenaltyBounds::new(mixed_bounds(), Config::disabled());
        let terms = penalty.terms(&dvector![2.0, 2.0, 0.0], &dvector![1.0, 1.0, 1.0]);

        assert_relative_eq!(terms.residual, DVector::zeros(3));
        assert_relative_eq!(terms.diagonal, DVector::zeros(3));
    }

    #[test]
    fn rejects_invalid_config() {
        assert_eq!(Config::new(-1.0, 0.1, 0.0), Err(ConfigError::MuInit));
        assert_eq!(Config::new(1.0, 0.0, 0.0), Err(ConfigError::Decay));
        assert_eq!(Config::new(1.0, 1.5, 0.0), Err(ConfigError::Decay));
        assert_eq!(Config::new(1e-3, 0.1, 1e-2), Err(ConfigError::Floor));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_partial_config() {
        let config: Config = serde_json::from_str(r#"{ "decay": 0.5 }"#).expect("valid");
        assert_relative_eq!(config.mu_init(), 1e-2);
        assert_relative_eq!(config.decay(), 0.5);

        assert!(serde_json::from_str::<Config>(r#"{ "floor": 1.0 }"#).is_err());
        assert!(serde_json::from_str::<Config>(r#"{ "mu": 1.0 }"#).is_err());
    }
}
