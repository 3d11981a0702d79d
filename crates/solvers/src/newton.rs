//! Globalized Newton iteration for bound-constrained nonlinear systems.
//!
//! # Algorithm
//!
//! Each iteration evaluates the Jacobian at the current states, augments the
//! residual and Jacobian with [interior penalty](crate::penalty) terms, adds
//! the [pseudo-transient](crate::continuation) shift `I/τ`, and solves
//!
//! ```text
//! (J + D_μ + I/τ) · d = −(r + b_μ)
//! ```
//!
//! for a direction `d`. The [line search](crate::line_search) then picks a
//! step `α` that keeps the states inside their bounds and decreases the model
//! residual norm. After the step, `τ` grows by the residual reduction ratio
//! and the penalty weights decay.
//!
//! The solve converges when `‖r‖ < atol` or `‖r‖ / ‖r₀‖ < rtol`.
//!
//! # Failure Handling
//!
//! - A singular Newton matrix shrinks `τ` and retries once.
//! - A failed line search while penalty weights are still positive releases
//!   the barrier and recomputes the step once without it. The barrier can
//!   leave a stationary point of the augmented system a little off the
//!   model's root when that root sits close to a bound.
//! - A failed line search otherwise ends the solve, unless
//!   [`LineSearchFailurePolicy::AcceptSmallest`] is set and the smallest trial
//!   step could be evaluated.
//! - Model errors and malformed Jacobians end the solve.
//!
//! Failures are reported through [`Solution::failure`], never by discarding
//! the last good state or the history. Failed iterations and recoveries also
//! leave a [`Note`] in the history.
//!
//! # Observer Events
//!
//! - [`Event::Iteration`] after each record is appended, including record 0
//! - [`Event::SingularRetry`] before a regularized retry
//!
//! Observers can return [`Action::StopEarly`] to halt. Convergence takes
//! precedence over a stop request made on the same record.

mod action;
mod config;
mod error;
mod event;
mod history;
mod solution;
mod solve;


pub use action::Action;
pub use config::{Config, ConfigError, LineSearchFailurePolicy};
pub use error::{Error, SetupError};
pub use event::Event;
pub use history::{History, IterationRecord, Note};
pub use solution::{Solution, Status};

use ipnewt_core::{DVector, Model, Observer};

use crate::{
    continuation::PseudoTransient,
    line_search::{AdaptiveLineSearch, LineSearch},
    linear::{LinearSystem, LuSolver},
    penalty::PenaltyBounds,
};

/// A Newton solver bound to a model and its components.
///
/// Built with [`setup`](Self::setup) (or [`new`](Self::new) for the default
/// components) and consumed by [`solve`](Self::solve).
pub struct NewtonSolver<M, L = LuSolver, S = AdaptiveLineSearch> {
    model: M,
    linear_system: L,
    line_search: S,
    config: Config,
    penalty: PenaltyBounds,
    continuation: PseudoTransient,
    states: DVector<f64>,
    residuals: DVector<f64>,
    residual_norm: f64,
}

impl<M: Model> NewtonSolver<M> {
    /// Sets up a solver with an LU linear solve and the default line search.
    ///
    /// # Errors
    ///
    /// See [`setup`](Self::setup).
    pub fn new(model: M, config: Config) -> Result<Self, SetupError> {
        Self::setup(
            model,
            LuSolver::default(),
            AdaptiveLineSearch::default(),
            config,
        )
    }
}

impl<M, L, S> NewtonSolver<M, L, S>
where
    M: Model,
    L: LinearSystem,
    S: LineSearch,
{
    /// Binds the model and components and evaluates the initial residuals.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] if the system is empty, the bounds or initial
    /// residuals do not match the number of states, an initial state is not
    /// strictly inside its bounds, or the initial residuals cannot be
    /// evaluated or are not finite.
    pub fn setup(
        model: M,
        linear_system: L,
        line_search: S,
        config: Config,
    ) -> Result<Self, SetupError> {
        let states = model.states();
        let n = states.len();
        if n == 0 {
            return Err(SetupError::Empty);
        }

        let bounds = model.bounds();
        if bounds.len() != n {
            return Err(SetupError::BoundsDimension {
                states: n,
                bounds: bounds.len(),
            });
        }
        if let Some(violation) = bounds.violation(&states) {
            return Err(violation.into());
        }

        let residuals = model
            .residuals(&states)
            .map_err(|e| SetupError::Model(Box::new(e)))?;
        if residuals.len() != n {
            return Err(SetupError::ResidualDimension {
                states: n,
                residuals: residuals.len(),
            });
        }
        if residuals.iter().any(|r| !r.is_finite()) {
            return Err(SetupError::NonFiniteResidual);
        }

        let residual_norm = residuals.norm();

        Ok(Self {
            model,
            linear_system,
            line_search,
            penalty: PenaltyBounds::new(bounds, *config.penalty()),
            continuation: PseudoTransient::new(*config.continuation()),
            config,
            states,
            residuals,
            residual_norm,
        })
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the initial states.
    #[must_use]
    pub fn states(&self) -> &DVector<f64> {
        &self.states
    }

    /// Returns the residual norm at the initial states.
    #[must_use]
    pub fn residual_norm(&self) -> f64 {
        self.residual_norm
    }

    /// Runs the Newton iteration to a terminal status.
    ///
    /// The observer receives an [`Event`] for each history record and each
    /// singular retry. See the [module docs](self) for details.
    pub fn solve<Obs>(self, observer: Obs) -> Solution
    where
        Obs: for<'a> Observer<Event<'a>, Action>,
    {
        self.run(observer)
    }

    /// Runs the Newton iteration without observer support.
    pub fn solve_unobserved(self) -> Solution {
        self.solve(())
    }
}
