/// Hook called by a solver at each reportable point of a solve.
///
/// An observer gets every event by reference. It returns `None` to let the
/// iteration continue or `Some(action)` to ask for one of the solver's
/// control actions, such as stopping early.
///
/// Any `FnMut(&E) -> Option<A>` closure is an observer. `()` observes nothing
/// and never acts. [`Both`] runs two observers on the same events.
pub trait Observer<E, A> {
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

/// Two observers that both see every event.
///
/// The first observer's action takes precedence when both ask for one.
/// Useful for pairing a recorder with a separate stopping rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct Both<O1, O2>(pub O1, pub O2);

impl<E, A, O1, O2> Observer<E, A> for Both<O1, O2>
where
    O1: Observer<E, A>,
    O2: Observer<E, A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        let first = self.0.observe(event);
        let second = self.1.observe(event);
        first.or(second)
    }
}
