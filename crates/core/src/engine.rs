//! The engine seam.
//!
//! An engine owns everything between an [`Operation`] and the cluster:
//! transport, connection pooling, node selection, retries and wire encoding.
//! The client layer only relies on one guarantee: each submission completes
//! its future at most once.

use std::sync::Arc;

use crate::future::StrataFuture;
use crate::operation::{Operation, QueryInfo, Response};

/// Future returned by an engine for one submission.
pub type EngineFuture = Arc<dyn StrataFuture<Response, QueryInfo>>;

/// Executes operation descriptors against a cluster.
///
/// Implementations complete the returned future on their own threads, never
/// on the submitting caller's thread.
pub trait Engine: Send + Sync {
    /// Submit one operation. Never blocks on the operation itself.
    fn execute(&self, operation: Operation) -> EngineFuture;

    /// Stop accepting operations and release resources.
    fn shutdown(&self) {}
}

impl<E: Engine + ?Sized> Engine for Arc<E> {
    fn execute(&self, operation: Operation) -> EngineFuture {
        (**self).execute(operation)
    }

    fn shutdown(&self) {
        (**self).shutdown()
    }
}
