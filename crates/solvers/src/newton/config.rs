use thiserror::Error;

use crate::{continuation, penalty};

/// What the solver does when the line search finds no acceptable step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LineSearchFailurePolicy {
    /// Stop with [`Status::Failed`](super::Status::Failed).
    #[default]
    Abort,

    /// Take the smallest step tried, as long as its residual is finite.
    AcceptSmallest,
}

/// Configuration for the Newton solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawConfig"))]
pub struct Config {
    max_iters: usize,
    atol: f64,
    rtol: f64,
    continuation: continuation::Config,
    penalty: penalty::Config,
    on_line_search_failure: LineSearchFailurePolicy,
}

/// Errors that can occur when validating a Newton solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_iters must be positive")]
    MaxIters,

    #[error("atol must be finite and positive")]
    Atol,

    #[error("rtol must be finite and positive")]
    Rtol,

    #[error(transparent)]
    Continuation(#[from] continuation::ConfigError),
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(100, 1.0, 1e-10, 1e-10).unwrap()
    }
}

impl Config {
    /// Creates a new validated config with default penalty settings.
    ///
    /// `tau = f64::INFINITY` disables pseudo-transient regularization. The
    /// ceiling on `tau` is `1e12`, or `tau` itself when larger; use
    /// [`with_tau_max`](Self::with_tau_max) to change it.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_iters` is zero, `tau` is not positive, or a
    /// tolerance is not finite and positive.
    pub fn new(max_iters: usize, tau: f64, atol: f64, rtol: f64) -> Result<Self, ConfigError> {
        if max_iters == 0 {
            return Err(ConfigError::MaxIters);
        }
        if !atol.is_finite() || atol <= 0.0 {
            return Err(ConfigError::Atol);
        }
        if !rtol.is_finite() || rtol <= 0.0 {
            return Err(ConfigError::Rtol);
        }

        Ok(Self {
            max_iters,
            atol,
            rtol,
            continuation: continuation::Config::with_default_ceiling(tau)?,
            penalty: penalty::Config::default(),
            on_line_search_failure: LineSearchFailurePolicy::default(),
        })
    }

    /// Returns a copy with a different ceiling on `tau`.
    ///
    /// # Errors
    ///
    /// Returns an error if `tau_max` is below the initial `tau`.
    pub fn with_tau_max(self, tau_max: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            continuation: continuation::Config::new(self.continuation.tau(), tau_max)?,
            ..self
        })
    }

    #[must_use]
    pub fn with_penalty(self, penalty: penalty::Config) -> Self {
        Self { penalty, ..self }
    }

    #[must_use]
    pub fn with_line_search_failure(self, policy: LineSearchFailurePolicy) -> Self {
        Self {
            on_line_search_failure: policy,
            ..self
        }
    }

    /// Returns the maximum number of Newton iterations.
    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Returns the absolute residual norm tolerance.
    #[must_use]
    pub fn atol(&self) -> f64 {
        self.atol
    }

    /// Returns the tolerance on the residual norm relative to the initial one.
    #[must_use]
    pub fn rtol(&self) -> f64 {
        self.rtol
    }

    /// Returns the initial pseudo-time step.
    #[must_use]
    pub fn tau(&self) -> f64 {
        self.continuation.tau()
    }

    #[must_use]
    pub fn tau_max(&self) -> f64 {
        self.continuation.tau_max()
    }

    #[must_use]
    pub fn continuation(&self) -> &continuation::Config {
        &self.continuation
    }

    #[must_use]
    pub fn penalty(&self) -> &penalty::Config {
        &self.penalty
    }

    #[must_use]
    pub fn on_line_search_failure(&self) -> LineSearchFailurePolicy {
        self.on_line_search_failure
    }

    /// Returns true if `residual_norm` meets either tolerance.
    ///
    /// The relative test is skipped when `initial_norm` is zero.
    #[must_use]
    pub fn is_converged(&self, residual_norm: f64, initial_norm: f64) -> bool {
        residual_norm < self.atol
            || (initial_norm > 0.0 && residual_norm / initial_norm < self.rtol)
    }
}

/// Mirror of [`Config`] as written in a config file.
///
/// Missing fields take their defaults. `"tau": null` means pure Newton
/// (`tau = ∞`); a missing or null `tau_max` uses the default ceiling.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    #[serde(alias = "maxiter")]
    max_iters: usize,
    tau: Option<f64>,
    tau_max: Option<f64>,
    atol: f64,
    rtol: f64,
    penalty: penalty::Config,
    on_line_search_failure: LineSearchFailurePolicy,
}

#[cfg(feature = "serde")]
impl Default for RawConfig {
    fn default() -> Self {
        let config = Config::default();
        Self {
            max_iters: config.max_iters,
            tau: Some(config.tau()),
            tau_max: None,
            atol: config.atol,
            rtol: config.rtol,
            penalty: config.penalty,
            on_line_search_failure: config.on_line_search_failure,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let config = Self::new(
            raw.max_iters,
            raw.tau.unwrap_or(f64::INFINITY),
            raw.atol,
            raw.rtol,
        )?
        .with_penalty(raw.penalty)
        .with_line_search_failure(raw.on_line_search_failure);

        match raw.tau_max {
            Some(tau_max) => config.with_tau_max(tau_max),
            None => Ok(config),
        }
    }
}
