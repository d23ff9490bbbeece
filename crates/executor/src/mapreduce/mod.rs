//! Secondary-index map-reduce.
//!
//! - [`index_input`]: the index query that feeds the job
//! - [`phase`]: map and reduce phases and their functions
//! - [`IndexMapReduce`]: the command that submits the whole request

pub mod index_input;
mod index_map_reduce;
pub mod phase;

pub use index_input::{serialize_index_input, IndexCriteria, IndexInput};
pub use index_map_reduce::{IndexMapReduce, IndexMapReduceBuilder, MapReduceResponse};
pub use phase::{Function, MapReducePhase, PhaseKind};
