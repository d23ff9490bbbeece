//! In-process engine for the Strata client
//!
//! This crate provides the one [`Engine`](strata_core::Engine) shipped with
//! the client:
//! - LocalEngine: completes operations on a worker pool through a handler
//! - WorkerPool: bounded FIFO job queue with a fixed set of threads
//! - EngineConfig: `strata-engine.toml` configuration
//!
//! Transport, retries and node selection belong to whatever the handler
//! delegates to.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod local;
pub mod pool;

pub use config::{EngineConfig, CONFIG_FILE_NAME};
pub use local::{LocalEngine, OperationHandler};
pub use pool::{PoolRejection, PoolStats, WorkerPool};
