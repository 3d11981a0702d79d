use ipnewt_core::DVector;

use super::{Error, History};

/// How the solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The residual norm met `atol` or `rtol`.
    Converged,

    /// Reached the iteration limit without converging.
    MaxIters,

    /// Stopped early due to an observer decision.
    StoppedByObserver,

    /// An unrecoverable error occurred; see [`Solution::failure`].
    Failed,
}

/// The result of a Newton solve.
///
/// On every status, `states` is the last accepted point and `history` holds
/// every record up to it.
#[derive(Debug)]
pub struct Solution {
    pub status: Status,

    /// Last accepted states.
    pub states: DVector<f64>,

    /// Model residuals at `states`.
    pub residuals: DVector<f64>,

    pub residual_norm: f64,

    /// Number of completed iterations.
    pub iters: usize,

    pub history: History,

    /// The error that ended the solve when `status` is [`Status::Failed`].
    pub failure: Option<Error>,
}

impl Solution {
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.status == Status::Converged
    }
}
