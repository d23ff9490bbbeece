use strata_core::CounterOp;

/// Accumulates counter increments.
///
/// ```ignore
/// let op = CounterMutation::new().increment(3).increment(4).get_op();
/// assert_eq!(op.increment, 7);
/// ```
///
/// The running total saturates at the `i64` bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterMutation {
    delta: i64,
}

impl CounterMutation {
    /// A mutation that changes nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount`; a negative amount decrements
    pub fn increment(mut self, amount: i64) -> Self {
        self.delta = self.delta.saturating_add(amount);
        self
    }

    /// Subtract `amount`
    pub fn decrement(mut self, amount: i64) -> Self {
        self.delta = self.delta.saturating_sub(amount);
        self
    }

    /// Net change so far
    pub fn delta(&self) -> i64 {
        self.delta
    }

    /// Fold into an immutable op
    pub fn get_op(&self) -> CounterOp {
        CounterOp {
            increment: self.delta,
        }
    }

    /// Counters sum.
    pub(crate) fn merge(&mut self, other: CounterMutation) {
        self.delta = self.delta.saturating_add(other.delta);
    }
}
