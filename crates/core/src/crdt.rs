//! CRDT operation descriptors
//!
//! A [`CrdtOp`] is the folded, immutable form of a client-side mutation. It is
//! pure data: the engine encodes it for the wire and the cluster applies it.
//! Nothing here merges or interprets replicated state.
//!
//! ```text
//! CrdtOp::Map(MapOp)
//!   └── entries (ordered by first touch)
//!         ├── ("visits", Counter) -> Update(Counter(+7))
//!         ├── ("tags",   Set)     -> Update(Set { adds: [..], removes: [..] })
//!         └── ("legacy", Flag)    -> Remove
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::BinaryValue;

/// Operation on a top-level datatype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrdtOp {
    /// Counter increment
    Counter(CounterOp),
    /// Set element adds and removes
    Set(SetOp),
    /// Map field adds, removes and updates
    Map(MapOp),
}

impl CrdtOp {
    /// True if applying this op changes nothing.
    ///
    /// Engines may skip the round trip for a no-op.
    pub fn is_noop(&self) -> bool {
        match self {
            CrdtOp::Counter(op) => op.is_noop(),
            CrdtOp::Set(op) => op.is_noop(),
            CrdtOp::Map(op) => op.is_noop(),
        }
    }

    /// Name of the datatype this op targets
    pub fn datatype(&self) -> &'static str {
        match self {
            CrdtOp::Counter(_) => "counter",
            CrdtOp::Set(_) => "set",
            CrdtOp::Map(_) => "map",
        }
    }
}

/// Signed counter increment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterOp {
    /// Net change; negative values decrement
    pub increment: i64,
}

impl CounterOp {
    /// True if the increment is zero
    pub fn is_noop(&self) -> bool {
        self.increment == 0
    }
}

/// Set element changes. An element appears in at most one of the two lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOp {
    /// Elements to add, in first-touch order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adds: Vec<BinaryValue>,
    /// Elements to remove, in first-touch order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removes: Vec<BinaryValue>,
}

impl SetOp {
    /// True if nothing is added or removed
    pub fn is_noop(&self) -> bool {
        self.adds.is_empty() && self.removes.is_empty()
    }
}

/// Datatype of a map field.
///
/// Registers and flags only exist inside maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Embedded counter
    Counter,
    /// Embedded set
    Set,
    /// Embedded map
    Map,
    /// Last-write-wins byte value
    Register,
    /// Enable/disable boolean
    Flag,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Counter => "counter",
            FieldKind::Set => "set",
            FieldKind::Map => "map",
            FieldKind::Register => "register",
            FieldKind::Flag => "flag",
        };
        f.write_str(name)
    }
}

/// A map field is identified by name *and* kind: `("a", Counter)` and
/// `("a", Set)` are different fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MapField {
    /// Field name
    pub name: String,
    /// Field datatype
    pub kind: FieldKind,
}

impl MapField {
    /// Create a field key
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for MapField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.name, self.kind)
    }
}

/// New content for a map field. The variant always matches the field's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldUpdate {
    /// Counter increment
    Counter(CounterOp),
    /// Set changes
    Set(SetOp),
    /// Nested map changes
    Map(MapOp),
    /// New register value
    Register(BinaryValue),
    /// New flag state
    Flag(bool),
}

impl FieldUpdate {
    /// The field kind this update applies to
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldUpdate::Counter(_) => FieldKind::Counter,
            FieldUpdate::Set(_) => FieldKind::Set,
            FieldUpdate::Map(_) => FieldKind::Map,
            FieldUpdate::Register(_) => FieldKind::Register,
            FieldUpdate::Flag(_) => FieldKind::Flag,
        }
    }
}

/// What happens to one map field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapEntryOp {
    /// Ensure the field exists with its empty value
    Add,
    /// Remove the field
    Remove,
    /// Apply an update to the field, creating it if absent
    Update(FieldUpdate),
}

/// One field of a [`MapOp`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEntry {
    /// Target field
    pub field: MapField,
    /// Operation on the field
    pub op: MapEntryOp,
}

/// Map changes. Each field appears at most once, in first-touch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapOp {
    /// Per-field operations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<MapEntry>,
}

impl MapOp {
    /// True if no field is touched
    pub fn is_noop(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the operation on a field
    pub fn get(&self, name: &str, kind: FieldKind) -> Option<&MapEntryOp> {
        self.entries
            .iter()
            .find(|entry| entry.field.name == name && entry.field.kind == kind)
            .map(|entry| &entry.op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ops_are_noops() {
        assert!(CrdtOp::Counter(CounterOp::default()).is_noop());
        assert!(CrdtOp::Set(SetOp::default()).is_noop());
        assert!(CrdtOp::Map(MapOp::default()).is_noop());
        assert!(!CrdtOp::Counter(CounterOp { increment: -1 }).is_noop());
    }

    #[test]
    fn test_field_update_kind() {
        assert_eq!(FieldUpdate::Flag(true).kind(), FieldKind::Flag);
        assert_eq!(
            FieldUpdate::Register(BinaryValue::from("v")).kind(),
            FieldKind::Register
        );
        assert_eq!(FieldUpdate::Map(MapOp::default()).kind(), FieldKind::Map);
    }

    #[test]
    fn test_map_get_distinguishes_kind() {
        let op = MapOp {
            entries: vec![MapEntry {
                field: MapField::new("a", FieldKind::Counter),
                op: MapEntryOp::Remove,
            }],
        };
        assert_eq!(op.get("a", FieldKind::Counter), Some(&MapEntryOp::Remove));
        assert_eq!(op.get("a", FieldKind::Set), None);
    }

    #[test]
    fn test_op_json_shape() {
        let op = CrdtOp::Counter(CounterOp { increment: 7 });
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json, serde_json::json!({"counter": {"increment": 7}}));

        let empty_set = serde_json::to_value(CrdtOp::Set(SetOp::default())).unwrap();
        assert_eq!(empty_set, serde_json::json!({"set": {}}));
    }

    #[test]
    fn test_map_field_display() {
        assert_eq!(MapField::new("visits", FieldKind::Counter).to_string(), "visits_counter");
    }
}
