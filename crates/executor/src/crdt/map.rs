use std::collections::HashMap;

use strata_core::{BinaryValue, FieldKind, FieldUpdate, MapEntry, MapEntryOp, MapField, MapOp};

use super::{CounterMutation, SetMutation};

/// Pending change to one map field.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldChange {
    Add,
    Remove,
    Counter(CounterMutation),
    Set(SetMutation),
    Map(MapMutation),
    Register(BinaryValue),
    Flag(bool),
}

impl FieldChange {
    fn is_update(&self) -> bool {
        !matches!(self, FieldChange::Add | FieldChange::Remove)
    }

    /// A nested update that would fold into a no-op
    fn is_empty_update(&self) -> bool {
        match self {
            FieldChange::Counter(m) => m.delta() == 0,
            FieldChange::Set(m) => m.is_empty(),
            FieldChange::Map(m) => m.is_empty(),
            _ => false,
        }
    }

    fn to_entry_op(&self) -> MapEntryOp {
        match self {
            FieldChange::Add => MapEntryOp::Add,
            FieldChange::Remove => MapEntryOp::Remove,
            FieldChange::Counter(m) => MapEntryOp::Update(FieldUpdate::Counter(m.get_op())),
            FieldChange::Set(m) => MapEntryOp::Update(FieldUpdate::Set(m.get_op())),
            FieldChange::Map(m) => MapEntryOp::Update(FieldUpdate::Map(m.get_op())),
            FieldChange::Register(v) => MapEntryOp::Update(FieldUpdate::Register(v.clone())),
            FieldChange::Flag(b) => MapEntryOp::Update(FieldUpdate::Flag(*b)),
        }
    }
}

/// Accumulates changes to the fields of a map.
///
/// A field is a `(name, kind)` pair. Repeated changes to the same field
/// merge:
///
/// | Existing | Incoming | Result |
/// |----------|----------|--------|
/// | counter update | counter update | increments summed |
/// | set update | set update | changes unioned, last change per element wins |
/// | map update | map update | merged field by field |
/// | any update | add | the update (it already creates the field) |
/// | anything else | anything | the incoming change |
///
/// An embedded counter, set or map update that changes nothing is not
/// recorded, so it neither touches the field nor replaces an earlier change.
///
/// Fields keep the order in which they were first touched.
#[derive(Debug, Clone, Default)]
pub struct MapMutation {
    fields: Vec<(MapField, FieldChange)>,
    index: HashMap<MapField, usize>,
}

impl MapMutation {
    /// A mutation that changes nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a field exists
    pub fn add(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.apply(MapField::new(name, kind), FieldChange::Add);
        self
    }

    /// Remove a field
    pub fn remove(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.apply(MapField::new(name, kind), FieldChange::Remove);
        self
    }

    /// Update an embedded counter
    pub fn update_counter(mut self, name: impl Into<String>, mutation: CounterMutation) -> Self {
        self.apply(
            MapField::new(name, FieldKind::Counter),
            FieldChange::Counter(mutation),
        );
        self
    }

    /// Update an embedded set
    pub fn update_set(mut self, name: impl Into<String>, mutation: SetMutation) -> Self {
        self.apply(MapField::new(name, FieldKind::Set), FieldChange::Set(mutation));
        self
    }

    /// Update an embedded map
    pub fn update_map(mut self, name: impl Into<String>, mutation: MapMutation) -> Self {
        self.apply(MapField::new(name, FieldKind::Map), FieldChange::Map(mutation));
        self
    }

    /// Set a register's value
    pub fn update_register(mut self, name: impl Into<String>, value: impl Into<BinaryValue>) -> Self {
        self.apply(
            MapField::new(name, FieldKind::Register),
            FieldChange::Register(value.into()),
        );
        self
    }

    /// Enable or disable a flag
    pub fn update_flag(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.apply(MapField::new(name, FieldKind::Flag), FieldChange::Flag(enabled));
        self
    }

    /// True if no field has been touched
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields touched
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Fold into an immutable op, recursing into nested mutations
    pub fn get_op(&self) -> MapOp {
        MapOp {
            entries: self
                .fields
                .iter()
                .map(|(field, change)| MapEntry {
                    field: field.clone(),
                    op: change.to_entry_op(),
                })
                .collect(),
        }
    }

    /// Merge `other` into this map, field by field in `other`'s order.
    pub(crate) fn merge(&mut self, other: MapMutation) {
        for (field, change) in other.fields {
            self.apply(field, change);
        }
    }

    fn apply(&mut self, field: MapField, incoming: FieldChange) {
        if incoming.is_empty_update() {
            return;
        }
        let Some(&slot) = self.index.get(&field) else {
            self.index.insert(field.clone(), self.fields.len());
            self.fields.push((field, incoming));
            return;
        };

        let existing = &mut self.fields[slot].1;
        match (existing, incoming) {
            (FieldChange::Counter(current), FieldChange::Counter(next)) => current.merge(next),
            (FieldChange::Set(current), FieldChange::Set(next)) => current.merge(next),
            (FieldChange::Map(current), FieldChange::Map(next)) => current.merge(next),
            (current, FieldChange::Add) if current.is_update() => {}
            (current, next) => *current = next,
        }
    }
}

impl PartialEq for MapMutation {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for MapMutation {}
