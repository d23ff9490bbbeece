//! In-process engine.
//!
//! [`LocalEngine`] completes every submitted [`Operation`] on its worker pool
//! by calling an [`OperationHandler`]. It has no transport of its own: the
//! handler decides what an operation means, whether that is forwarding it to
//! a cluster connection or answering from a fixture in tests.
//!
//! Per submission:
//! 1. A pending [`DefaultFuture`] is created with the operation's [`QueryInfo`]
//! 2. A job is queued; if the queue rejects it the future fails with `Rejected`
//! 3. A worker claims the future (`try_start`); a cancelled future is skipped
//! 4. The handler runs and its result completes the future on the worker thread

use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use strata_core::{
    DefaultFuture, Engine, EngineFuture, Error, Operation, QueryInfo, Response, Result,
};

use crate::config::EngineConfig;
use crate::pool::{PoolStats, WorkerPool};

/// Worker thread name prefix.
const WORKER_NAME_PREFIX: &str = "strata-engine";

/// Performs one operation on behalf of a [`LocalEngine`].
///
/// Called on an engine worker thread.
pub trait OperationHandler: Send + Sync + 'static {
    /// Perform `operation` and return the engine-level response
    fn handle(&self, operation: &Operation) -> Result<Response>;
}

impl<F> OperationHandler for F
where
    F: Fn(&Operation) -> Result<Response> + Send + Sync + 'static,
{
    fn handle(&self, operation: &Operation) -> Result<Response> {
        self(operation)
    }
}

/// Engine that runs operations through a handler on a worker pool.
///
/// # Example
///
/// ```ignore
/// use strata_engine::{EngineConfig, LocalEngine};
/// use strata_core::{Engine, Operation, Response};
///
/// let engine = LocalEngine::from_fn(&EngineConfig::default(), |_op| Ok(Response::Unit))?;
/// let future = engine.execute(operation);
/// ```
pub struct LocalEngine {
    handler: Arc<dyn OperationHandler>,
    pool: WorkerPool,
}

impl LocalEngine {
    /// Start an engine with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the configuration is out of range.
    pub fn new(config: &EngineConfig, handler: impl OperationHandler) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            handler: Arc::new(handler),
            pool: WorkerPool::new(
                WORKER_NAME_PREFIX,
                config.worker_threads,
                config.max_queue_depth,
            ),
        })
    }

    /// Start an engine whose handler is a closure.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the configuration is out of range.
    pub fn from_fn<F>(config: &EngineConfig, handler: F) -> Result<Self>
    where
        F: Fn(&Operation) -> Result<Response> + Send + Sync + 'static,
    {
        Self::new(config, handler)
    }

    /// Block until every submitted operation has completed.
    pub fn drain(&self) {
        self.pool.drain()
    }

    /// Worker pool metrics
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

impl Engine for LocalEngine {
    fn execute(&self, operation: Operation) -> EngineFuture {
        let id = Uuid::new_v4();
        let name = operation.name();
        let future: Arc<DefaultFuture<Response, QueryInfo>> =
            DefaultFuture::new(operation.query_info());
        debug!(operation = name, %id, "submitting operation");

        let job_future = Arc::clone(&future);
        let handler = Arc::clone(&self.handler);
        let submitted = self
            .pool
            .submit(move || run_operation(id, handler.as_ref(), &operation, &job_future));

        if let Err(rejection) = submitted {
            warn!(operation = name, %id, %rejection, "engine rejected operation");
            let _ = future.set_failure(Error::Rejected {
                reason: rejection.to_string(),
            });
        }
        future
    }

    fn shutdown(&self) {
        self.pool.shutdown()
    }
}

fn run_operation(
    id: Uuid,
    handler: &dyn OperationHandler,
    operation: &Operation,
    future: &DefaultFuture<Response, QueryInfo>,
) {
    let name = operation.name();
    if !future.try_start() {
        debug!(operation = name, %id, "operation cancelled before start");
        return;
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        handler.handle(operation)
    }));

    let completed = match result {
        Ok(Ok(response)) => {
            debug!(operation = name, %id, response = response.variant_name(), "operation succeeded");
            future.set_success(response)
        }
        Ok(Err(e)) => {
            debug!(operation = name, %id, error = %e, "operation failed");
            future.set_failure(e)
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "(non-string panic)".to_string());
            error!(operation = name, %id, %message, "operation handler panicked");
            future.set_failure(Error::internal(format!("handler panicked: {}", message)))
        }
    };

    if completed.is_err() {
        error!(operation = name, %id, "engine future completed twice");
    }
}
