//! Client-side CRDT mutation builders.
//!
//! Mutations accumulate changes locally and fold into an immutable
//! [`CrdtOp`] with `get_op`. Folding is pure: calling it twice without an
//! intervening change yields equal ops, and a mutation nested into a map is
//! moved there, so it cannot be changed behind its parent's back.
//!
//! ```text
//! DatatypeMutation::for_map()
//!     .update_counter("visits", CounterMutation::new().increment(1))
//!     .update_set("tags", SetMutation::new().add("rust"))
//!     .update_map("profile", MapMutation::new().update_register("name", "alice"))
//! ```

mod counter;
mod map;
mod set;

pub use counter::CounterMutation;
pub use map::MapMutation;
pub use set::SetMutation;

use strata_core::CrdtOp;

/// A mutation on a top-level datatype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatatypeMutation {
    /// Map mutation
    Map(MapMutation),
    /// Set mutation
    Set(SetMutation),
    /// Counter mutation
    Counter(CounterMutation),
}

impl DatatypeMutation {
    /// Start an empty map mutation
    pub fn for_map() -> MapMutation {
        MapMutation::new()
    }

    /// Start an empty set mutation
    pub fn for_set() -> SetMutation {
        SetMutation::new()
    }

    /// Start an empty counter mutation
    pub fn for_counter() -> CounterMutation {
        CounterMutation::new()
    }

    /// Fold into the op for this datatype
    pub fn get_op(&self) -> CrdtOp {
        match self {
            DatatypeMutation::Map(m) => CrdtOp::Map(m.get_op()),
            DatatypeMutation::Set(m) => CrdtOp::Set(m.get_op()),
            DatatypeMutation::Counter(m) => CrdtOp::Counter(m.get_op()),
        }
    }
}

impl From<MapMutation> for DatatypeMutation {
    fn from(m: MapMutation) -> Self {
        DatatypeMutation::Map(m)
    }
}

impl From<SetMutation> for DatatypeMutation {
    fn from(m: SetMutation) -> Self {
        DatatypeMutation::Set(m)
    }
}

impl From<CounterMutation> for DatatypeMutation {
    fn from(m: CounterMutation) -> Self {
        DatatypeMutation::Counter(m)
    }
}
