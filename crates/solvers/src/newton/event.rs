use crate::linear;

use super::{History, IterationRecord};

/// Events emitted by the Newton solver.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// A record was appended to the history.
    ///
    /// Emitted for the initial point (`record.iter == 0`) and after every
    /// accepted step.
    Iteration {
        record: &'a IterationRecord,
        history: &'a History,
    },

    /// The Newton matrix was singular and `tau` was shrunk for a retry.
    SingularRetry {
        iter: usize,

        /// The shrunk `tau` used for the retry.
        tau: f64,

        error: &'a linear::Error,
    },
}

impl Event<'_> {
    /// Returns the iteration the event belongs to.
    #[must_use]
    pub fn iter(&self) -> usize {
        match self {
            Self::Iteration { record, .. } => record.iter,
            Self::SingularRetry { iter, .. } => *iter,
        }
    }
}
