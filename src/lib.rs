//! Strata client - commands, CRDT mutations and map-reduce queries for a
//! replicated key-value store
//!
//! Commands are built and validated up front, submitted to an engine as a
//! single operation, and answered through futures that convert the engine's
//! response into the command's own types.
//!
//! # Quick Start
//!
//! ```ignore
//! use strata_client::*;
//!
//! let client = StrataClient::local(&EngineConfig::default(), handler)?;
//!
//! let fetch = FetchBucketProperties::builder()
//!     .with_namespace(Namespace::new("users"))
//!     .build()?;
//! let future = client.execute_async(&fetch);
//! future.add_listener(Arc::new(|f: &dyn StrataFuture<BucketProperties, Namespace>| {
//!     println!("n_val = {:?}", f.get_now().and_then(|p| p.n_val));
//! }));
//! ```
//!
//! # Architecture
//!
//! | Crate | Role |
//! |-------|------|
//! | `strata-core` | Types, operation descriptors, CRDT ops, the future contract |
//! | `strata-engine` | `LocalEngine`: worker pool, configuration |
//! | `strata-executor` | Commands, future adapter, mutation builders, map-reduce |
//!
//! Only the executor API is re-exported here.

// Re-export the public API from strata-executor
pub use strata_executor::*;
