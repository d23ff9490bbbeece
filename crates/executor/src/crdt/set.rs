use std::collections::HashMap;

use strata_core::{BinaryValue, SetOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Add,
    Remove,
}

/// Accumulates set element adds and removes.
///
/// The last change to an element wins: adding then removing `x` leaves only
/// the remove. Elements keep the order in which they were first touched.
#[derive(Debug, Clone, Default)]
pub struct SetMutation {
    order: Vec<BinaryValue>,
    changes: HashMap<BinaryValue, Change>,
}

impl SetMutation {
    /// A mutation that changes nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element
    pub fn add(mut self, element: impl Into<BinaryValue>) -> Self {
        self.record(element.into(), Change::Add);
        self
    }

    /// Remove an element
    pub fn remove(mut self, element: impl Into<BinaryValue>) -> Self {
        self.record(element.into(), Change::Remove);
        self
    }

    /// True if no element has been touched
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Fold into an immutable op
    pub fn get_op(&self) -> SetOp {
        let mut op = SetOp::default();
        for element in &self.order {
            match self.changes.get(element) {
                Some(Change::Add) => op.adds.push(element.clone()),
                Some(Change::Remove) => op.removes.push(element.clone()),
                None => {}
            }
        }
        op
    }

    /// Sets union; `other`'s changes are applied after ours.
    pub(crate) fn merge(&mut self, other: SetMutation) {
        let SetMutation { order, mut changes } = other;
        for element in order {
            if let Some(change) = changes.remove(&element) {
                self.record(element, change);
            }
        }
    }

    fn record(&mut self, element: BinaryValue, change: Change) {
        if self.changes.insert(element.clone(), change).is_none() {
            self.order.push(element);
        }
    }
}

impl PartialEq for SetMutation {
    fn eq(&self, other: &Self) -> bool {
        self.get_op() == other.get_op()
    }
}

impl Eq for SetMutation {}
