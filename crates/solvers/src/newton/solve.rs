use ipnewt_core::{DVector, Model, Observer};
use log::{debug, info, warn};

use crate::{
    line_search::{Context, LineSearch, LineSearchFailure, Trial},
    linear::LinearSystem,
};

use super::{
    Action, Error, Event, History, IterationRecord, LineSearchFailurePolicy, NewtonSolver,
    Solution, Status,
};

/// Outcome of computing a search direction.
enum Step {
    Direction(DVector<f64>),
    Stop,
}

impl<M, L, S> NewtonSolver<M, L, S>
where
    M: Model,
    L: LinearSystem,
    S: LineSearch,
{
    pub(super) fn run<Obs>(mut self, mut observer: Obs) -> Solution
    where
        Obs: for<'a> Observer<Event<'a>, Action>,
    {
        let initial_norm = self.residual_norm;
        let mut history = History::default();

        history.push(self.record(0, 0.0, initial_norm));
        let action = notify(&mut observer, &history);

        if self.config.is_converged(initial_norm, initial_norm) {
            return self.finish(Status::Converged, 0, history, None);
        }
        if action == Some(Action::StopEarly) {
            return self.finish(Status::StoppedByObserver, 0, history, None);
        }

        for iter in 1..=self.config.max_iters() {
            let attempt = match self.attempt(iter, &mut observer) {
                Err(Error::LineSearch { .. }) if self.penalty.is_active() => {
                    warn!("iteration {iter}: line search stalled, releasing penalty weights");
                    history.note(iter, "line search stalled, penalty weights released");
                    self.penalty.release();
                    self.attempt(iter, &mut observer)
                }
                attempt => attempt,
            };

            let trial = match attempt {
                Ok(Some(trial)) => trial,
                Ok(None) => {
                    return self.finish(Status::StoppedByObserver, iter - 1, history, None);
                }
                Err(error) => return self.finish(Status::Failed, iter - 1, history, Some(error)),
            };

            let prev_norm = self.residual_norm;
            self.states = trial.states;
            self.residuals = trial.residuals;
            self.residual_norm = trial.residual_norm;

            history.push(self.record(iter, trial.alpha, initial_norm));
            debug!(
                "iteration {iter}: |r| = {:e}, tau = {:e}, alpha = {:e}",
                self.residual_norm,
                self.continuation.tau(),
                trial.alpha,
            );

            self.continuation.update(prev_norm, self.residual_norm);
            self.penalty.decay();

            let action = notify(&mut observer, &history);

            if self.config.is_converged(self.residual_norm, initial_norm) {
                return self.finish(Status::Converged, iter, history, None);
            }
            if action == Some(Action::StopEarly) {
                return self.finish(Status::StoppedByObserver, iter, history, None);
            }
        }

        let iters = self.config.max_iters();
        self.finish(Status::MaxIters, iters, history, None)
    }

    /// Computes a direction and line searches along it.
    ///
    /// Returns `None` if the observer stopped the solve.
    fn attempt<Obs>(&mut self, iter: usize, observer: &mut Obs) -> Result<Option<Trial>, Error>
    where
        Obs: for<'a> Observer<Event<'a>, Action>,
    {
        match self.direction(iter, observer)? {
            Step::Direction(direction) => self.step(iter, &direction).map(Some),
            Step::Stop => Ok(None),
        }
    }

    /// Solves the regularized Newton system, retrying once on singularity.
    fn direction<Obs>(&mut self, iter: usize, observer: &mut Obs) -> Result<Step, Error>
    where
        Obs: for<'a> Observer<Event<'a>, Action>,
    {
        let mut matrix = self
            .model
            .jacobian(&self.states)
            .map_err(|e| Error::Model {
                iter,
                source: Box::new(e),
            })?;

        let n = self.states.len();
        if matrix.shape() != (n, n) {
            return Err(Error::JacobianDimension {
                iter,
                rows: matrix.nrows(),
                cols: matrix.ncols(),
                n,
            });
        }

        let mut residuals = self.residuals.clone();
        self.penalty
            .augment(&self.states, &mut residuals, &mut matrix);
        let rhs = -residuals;

        let mut regularized = matrix.clone();
        self.continuation.regularize(&mut regularized);

        match self.linear_system.solve(regularized, &rhs) {
            Ok(direction) => return Ok(Step::Direction(direction)),
            Err(error) if error.is_singular() => {
                let tau = self.continuation.shrink();
                warn!("iteration {iter}: {error}, retrying with tau = {tau:e}");

                let event = Event::SingularRetry {
                    iter,
                    tau,
                    error: &error,
                };
                if observer.observe(&event) == Some(Action::StopEarly) {
                    return Ok(Step::Stop);
                }
            }
            Err(source) => return Err(Error::LinearSystem { iter, source }),
        }

        self.continuation.regularize(&mut matrix);
        self.linear_system
            .solve(matrix, &rhs)
            .map(Step::Direction)
            .map_err(|source| Error::LinearSystem { iter, source })
    }

    /// Runs the line search along `direction`.
    fn step(&mut self, iter: usize, direction: &DVector<f64>) -> Result<Trial, Error> {
        let n = self.states.len();
        let model = &self.model;
        let ctx = Context {
            states: &self.states,
            direction,
            bounds: self.penalty.bounds(),
            residual_norm: self.residual_norm,
        };

        let result = self.line_search.search(&ctx, |x| match model.residuals(x) {
            Ok(r) if r.len() == n && r.iter().all(|v| v.is_finite()) => Some(r),
            Ok(_) => None,
            Err(e) => {
                debug!("iteration {iter}: model failed at trial point: {e}");
                None
            }
        });

        match result {
            Ok(trial) => Ok(trial),
            Err(LineSearchFailure {
                last: Some(trial), ..
            }) if self.config.on_line_search_failure()
                == LineSearchFailurePolicy::AcceptSmallest =>
            {
                warn!(
                    "iteration {iter}: line search failed, accepting alpha = {:e}",
                    trial.alpha
                );
                Ok(trial)
            }
            Err(source) => Err(Error::LineSearch { iter, source }),
        }
    }

    fn record(&self, iter: usize, alpha: f64, initial_norm: f64) -> IterationRecord {
        let relative_residual = if initial_norm > 0.0 {
            self.residual_norm / initial_norm
        } else {
            0.0
        };

        IterationRecord {
            iter,
            states: self.states.clone(),
            residual_norm: self.residual_norm,
            relative_residual,
            tau: self.continuation.tau(),
            alpha,
            mu_lower: self.penalty.state().mu_lower().clone(),
            mu_upper: self.penalty.state().mu_upper().clone(),
        }
    }

    fn finish(
        self,
        status: Status,
        iters: usize,
        mut history: History,
        failure: Option<Error>,
    ) -> Solution {
        match &failure {
            Some(error) => {
                warn!("newton solve failed after {iters} iterations: {error}");
                history.note(error.iter(), error.to_string());
            }
            None => info!(
                "newton solve finished with {status:?} after {iters} iterations, |r| = {:e}",
                self.residual_norm
            ),
        }

        Solution {
            status,
            states: self.states,
            residuals: self.residuals,
            residual_norm: self.residual_norm,
            iters,
            history,
            failure,
        }
    }
}

/// Emits the latest history record to the observer.
fn notify<Obs>(observer: &mut Obs, history: &History) -> Option<Action>
where
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let record = history.last()?;
    observer.observe(&Event::Iteration { record, history })
}
