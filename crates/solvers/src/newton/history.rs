use ipnewt_core::DVector;

/// Snapshot of the solver after one iteration.
///
/// Record 0 is the initial point and has `alpha = 0`. For later records,
/// `tau` and the penalty weights are the values used to compute the step.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    pub iter: usize,
    pub states: DVector<f64>,

    /// Residual norm `‖r‖`, compared against `atol`.
    pub residual_norm: f64,

    /// `‖r‖ / ‖r₀‖`, compared against `rtol`.
    pub relative_residual: f64,

    pub tau: f64,

    /// Accepted step length.
    pub alpha: f64,

    pub mu_lower: DVector<f64>,
    pub mu_upper: DVector<f64>,
}

/// A diagnostic attached to an iteration that produced no record of its own,
/// or whose step needed a recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub iter: usize,
    pub message: String,
}

/// Ordered, append-only list of iteration records and diagnostic notes.
///
/// Only accepted steps get a record. An iteration that fails still leaves a
/// [`Note`] with its number and the error message, so the history of a
/// failed solve always names the triggering iteration. The error itself is
/// in [`Solution::failure`](super::Solution::failure).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    records: Vec<IterationRecord>,
    notes: Vec<Note>,
}

impl History {
    pub(super) fn push(&mut self, record: IterationRecord) {
        debug_assert_eq!(record.iter, self.records.len());
        self.records.push(record);
    }

    pub(super) fn note(&mut self, iter: usize, message: impl Into<String>) {
        self.notes.push(Note {
            iter,
            message: message.into(),
        });
    }

    /// Returns the diagnostic notes in the order they were added.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, iter: usize) -> Option<&IterationRecord> {
        self.records.get(iter)
    }

    #[must_use]
    pub fn last(&self) -> Option<&IterationRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IterationRecord> {
        self.records.iter()
    }

    /// Returns the residual norm of every record in order.
    #[must_use]
    pub fn residual_norms(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.residual_norm).collect()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a IterationRecord;
    type IntoIter = std::slice::Iter<'a, IterationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
