//! Pseudo-transient continuation.
//!
//! Adds `I/τ` to the Newton matrix. Small `τ` gives short, gradient-like
//! steps that are robust far from a root; `τ = ∞` recovers pure Newton.
//! After each accepted step `τ` grows by the residual reduction ratio
//! (switched evolution relaxation), so the method turns into Newton as the
//! residual falls.

use ipnewt_core::DMatrix;
use thiserror::Error;

/// Configuration for the pseudo-time step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    tau: f64,
    tau_max: f64,
}

/// Errors that can occur when validating a continuation config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tau must be positive")]
    Tau,

    #[error("tau_max must be at least tau")]
    TauMax,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1.0, Self::DEFAULT_TAU_MAX).unwrap()
    }
}

impl Config {
    pub const DEFAULT_TAU_MAX: f64 = 1e12;

    /// Creates a new validated config.
    ///
    /// Both values may be infinite.
    ///
    /// # Errors
    ///
    /// Returns an error if `tau` is not positive or `tau_max < tau`.
    pub fn new(tau: f64, tau_max: f64) -> Result<Self, ConfigError> {
        if tau.is_nan() || tau <= 0.0 {
            return Err(ConfigError::Tau);
        }
        if tau_max.is_nan() || tau_max < tau {
            return Err(ConfigError::TauMax);
        }
        Ok(Self { tau, tau_max })
    }

    /// Creates a config whose ceiling is the default or `tau`, whichever is larger.
    ///
    /// # Errors
    ///
    /// Returns an error if `tau` is not positive.
    pub fn with_default_ceiling(tau: f64) -> Result<Self, ConfigError> {
        Self::new(tau, Self::DEFAULT_TAU_MAX.max(tau))
    }

    /// Returns the initial pseudo-time step.
    #[must_use]
    pub fn tau(&self) -> f64 {
        self.tau
    }

    #[must_use]
    pub fn tau_max(&self) -> f64 {
        self.tau_max
    }
}

/// Pseudo-time state carried across iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PseudoTransient {
    tau: f64,
    tau_max: f64,
}

impl PseudoTransient {
    /// Factor applied to `tau` when the Newton matrix is singular.
    pub const SHRINK: f64 = 0.1;

    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tau: config.tau(),
            tau_max: config.tau_max(),
        }
    }

    #[must_use]
    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Adds `1/τ` to the diagonal of `matrix`.
    pub fn regularize(&self, matrix: &mut DMatrix<f64>) {
        if self.tau.is_finite() {
            let shift = self.tau.recip();
            for i in 0..matrix.nrows().min(matrix.ncols()) {
                matrix[(i, i)] += shift;
            }
        }
    }

    /// Grows `τ` by the residual reduction `prev / new`, capped at `tau_max`.
    ///
    /// A zero new residual sends `τ` straight to the ceiling.
    pub fn update(&mut self, prev_norm: f64, new_norm: f64) {
        self.tau = if new_norm > 0.0 {
            (self.tau * prev_norm / new_norm).min(self.tau_max)
        } else {
            self.tau_max
        };
    }

    /// Shrinks `τ` after a singular solve and returns the new value.
    ///
    /// Infinite `τ` restarts at 1.
    pub fn shrink(&mut self) -> f64 {
        self.tau = if self.tau.is_finite() {
            self.tau * Self::SHRINK
        } else {
            1.0
        };
        self.tau
    }
}
