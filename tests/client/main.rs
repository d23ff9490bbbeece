//! Client Tests
//!
//! End-to-end tests through `StrataClient` and a `LocalEngine` backed by an
//! in-memory cluster:
//! - Bucket property fetch and store
//! - Object writes with secondary indexes
//! - CRDT datatype updates
//! - Secondary-index map-reduce
//! - Future semantics: listeners, cancellation, bounded waits
//! - Engine configuration files

mod common;

mod bucket_properties;
mod config;
mod datatypes;
mod futures;
mod index_map_reduce;
