//! Step length selection along a Newton direction.
//!
//! A [`LineSearch`] receives the current point, a search direction and a
//! residual evaluator, and returns an accepted [`Trial`]. Trial points are
//! always strictly inside the bounds: the model is never evaluated outside
//! its box.

mod adaptive;
mod config;

pub use adaptive::AdaptiveLineSearch;
pub use config::{Config, ConfigError};

use ipnewt_core::{Bounds, DVector};
use thiserror::Error;

/// Chooses a step length along a search direction.
pub trait LineSearch {
    /// Searches along `ctx.direction` for an acceptable step.
    ///
    /// `eval` returns the model residuals at a trial point, or `None` if the
    /// model failed or produced non-finite values there.
    ///
    /// # Errors
    ///
    /// Returns [`LineSearchFailure`] if no acceptable step was found.
    fn search<F>(&mut self, ctx: &Context<'_>, eval: F) -> Result<Trial, LineSearchFailure>
    where
        F: FnMut(&DVector<f64>) -> Option<DVector<f64>>;
}

/// The point a line search starts from.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// Current states, strictly inside `bounds`.
    pub states: &'a DVector<f64>,

    /// Search direction.
    pub direction: &'a DVector<f64>,

    pub bounds: &'a Bounds,

    /// Model residual norm at `states`.
    pub residual_norm: f64,
}

/// An evaluated point along the search direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub alpha: f64,
    pub states: DVector<f64>,
    pub residuals: DVector<f64>,
    pub residual_norm: f64,
}

/// No step along the direction gave sufficient decrease.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("no acceptable step after {contractions} contractions (smallest alpha {alpha:e})")]
pub struct LineSearchFailure {
    /// Smallest step length tried.
    pub alpha: f64,

    /// Number of contractions performed.
    pub contractions: usize,

    /// The trial at `alpha`, if the model could be evaluated there.
    pub last: Option<Trial>,
}
