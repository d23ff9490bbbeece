//! # Strata Executor
//!
//! Command layer of the Strata client. Commands are validated by their
//! builders, submitted to an [`Engine`] as one [`Operation`] each, and
//! answered through a [`FutureAdapter`] that converts the engine's response
//! into the command's own types.
//!
//! ## Quick Start
//!
//! ```text
//! use strata_executor::*;
//!
//! let client = StrataClient::local(&EngineConfig::default(), handler)?;
//!
//! let update = UpdateDatatype::builder()
//!     .with_location(Location::new("stats").with_bucket_type("maps").with_key("alice"))
//!     .with_mutation(
//!         DatatypeMutation::for_map()
//!             .update_counter("visits", CounterMutation::new().increment(1))
//!             .update_set("tags", SetMutation::new().add("rust")),
//!     )
//!     .build()?;
//! client.execute(&update)?;
//! ```
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`adapter`] | [`FutureAdapter`]: value and context conversion over an engine future |
//! | [`command`] | [`Command`] trait |
//! | `commands` | Bucket property, store value and datatype update commands |
//! | [`crdt`] | Counter, set and map mutation builders |
//! | [`mapreduce`] | Secondary-index map-reduce and its input serializer |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
mod client;
pub mod command;
mod commands;
pub mod crdt;
pub mod mapreduce;

#[cfg(test)]
mod tests;

pub use adapter::FutureAdapter;
pub use client::StrataClient;
pub use command::{ClientFuture, Command};
pub use commands::{
    FetchBucketProperties, FetchBucketPropertiesBuilder, StoreBucketProperties,
    StoreBucketPropertiesBuilder, StoreValue, StoreValueBuilder, StoreValueResponse,
    UpdateDatatype, UpdateDatatypeBuilder, UpdateDatatypeResponse,
};
pub use crdt::{CounterMutation, DatatypeMutation, MapMutation, SetMutation};
pub use mapreduce::{
    serialize_index_input, Function, IndexCriteria, IndexInput, IndexMapReduce,
    IndexMapReduceBuilder, MapReducePhase, MapReduceResponse, PhaseKind,
};

// Re-export core types so users don't need strata-core directly
pub use strata_core::{
    BinaryValue, BucketProperties, CounterOp, CrdtOp, Engine, EngineFuture, Error, FieldKind,
    FieldUpdate, FutureListener, IndexValue, Location, MapEntry, MapEntryOp, MapField, MapOp,
    Namespace, Operation, QueryInfo, Response, Result, SetOp, StoredObject, StrataFuture,
    WaitStatus, DEFAULT_BUCKET_TYPE,
};

// Re-export engine types so users don't need strata-engine directly
pub use strata_engine::{EngineConfig, LocalEngine, OperationHandler, CONFIG_FILE_NAME};
