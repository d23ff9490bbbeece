//! Core types and traits for the Strata client
//!
//! This crate defines the foundational types shared by engines and the
//! client-facing executor:
//! - Error: error taxonomy and `Result` alias
//! - BinaryValue, Namespace, Location, IndexValue: addressing types
//! - Operation, Response, QueryInfo: engine-level descriptors
//! - CrdtOp: folded CRDT mutation descriptors
//! - StrataFuture, FutureListener, Completion, DefaultFuture: future contract
//! - Engine: the seam between the client and the transport

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod crdt;
pub mod engine;
pub mod error;
pub mod future;
pub mod operation;
pub mod types;

pub use crdt::{
    CounterOp, CrdtOp, FieldKind, FieldUpdate, MapEntry, MapEntryOp, MapField, MapOp, SetOp,
};
pub use engine::{Engine, EngineFuture};
pub use error::{AlreadyCompleted, Error, Result};
pub use future::{
    Completion, DefaultFuture, FutureListener, Outcome, StrataFuture, WaitStatus,
};
pub use operation::{BucketProperties, Operation, QueryInfo, Response, StoredObject};
pub use types::{BinaryValue, IndexValue, Location, Namespace, DEFAULT_BUCKET_TYPE};
