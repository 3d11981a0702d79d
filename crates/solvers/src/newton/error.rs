use ipnewt_core::Violation;
use thiserror::Error;

use crate::{line_search::LineSearchFailure, linear};

/// Errors that prevent a Newton solver from being set up.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("system has no unknowns")]
    Empty,

    #[error("bounds have {bounds} entries but there are {states} states")]
    BoundsDimension { states: usize, bounds: usize },

    #[error("residuals have {residuals} entries but there are {states} states")]
    ResidualDimension { states: usize, residuals: usize },

    #[error("initial state {index} = {value} is not inside ({lower}, {upper})")]
    OutOfBounds {
        index: usize,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("model error at initial state: {0}")]
    Model(Box<dyn std::error::Error + Send + Sync>),

    #[error("initial residuals are not finite")]
    NonFiniteResidual,
}

/// Errors that end a solve with [`Status::Failed`](super::Status::Failed).
///
/// `iter` is the iteration in which the failure occurred.
#[derive(Debug, Error)]
pub enum Error {
    #[error("model error in iteration {iter}: {source}")]
    Model {
        iter: usize,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("jacobian is {rows}×{cols} in iteration {iter}, expected {n}×{n}")]
    JacobianDimension {
        iter: usize,
        rows: usize,
        cols: usize,
        n: usize,
    },

    #[error("linear solve failed in iteration {iter}: {source}")]
    LinearSystem { iter: usize, source: linear::Error },

    #[error("line search failed in iteration {iter}: {source}")]
    LineSearch {
        iter: usize,
        source: LineSearchFailure,
    },
}

impl From<Violation> for SetupError {
    fn from(v: Violation) -> Self {
        Self::OutOfBounds {
            index: v.index,
            value: v.value,
            lower: v.lower,
            upper: v.upper,
        }
    }
}

impl Error {
    /// Returns the iteration in which the failure occurred.
    #[must_use]
    pub fn iter(&self) -> usize {
        match self {
            Self::Model { iter, .. }
            | Self::JacobianDimension { iter, .. }
            | Self::LinearSystem { iter, .. }
            | Self::LineSearch { iter, .. } => *iter,
        }
    }
}
