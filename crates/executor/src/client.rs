//! Client entry point.

use std::sync::Arc;
use tracing::info;

use strata_core::{Engine, Result};
use strata_engine::{EngineConfig, LocalEngine, OperationHandler};

use crate::command::{ClientFuture, Command};

/// Runs commands against one engine.
///
/// Cloning is cheap; clones share the engine.
///
/// # Example
///
/// ```ignore
/// use strata_executor::{FetchBucketProperties, Namespace, StrataClient};
///
/// let client = StrataClient::local(&EngineConfig::default(), handler)?;
/// let fetch = FetchBucketProperties::builder()
///     .with_namespace(Namespace::new("users"))
///     .build()?;
/// let properties = client.execute(&fetch)?;
/// ```
#[derive(Clone)]
pub struct StrataClient {
    engine: Arc<dyn Engine>,
}

impl StrataClient {
    /// Wrap an existing engine
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    /// Start a [`LocalEngine`] with `handler` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the configuration is out of range.
    pub fn local(config: &EngineConfig, handler: impl OperationHandler) -> Result<Self> {
        let engine = LocalEngine::new(config, handler)?;
        info!(
            worker_threads = config.worker_threads,
            max_queue_depth = config.max_queue_depth,
            "started local engine"
        );
        Ok(Self::new(Arc::new(engine)))
    }

    /// The wrapped engine
    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    /// Submit `command` and return its future.
    pub fn execute_async<C: Command>(&self, command: &C) -> ClientFuture<C::Response, C::Info> {
        command.execute_async(self.engine())
    }

    /// Submit `command` and block for its response.
    ///
    /// # Errors
    ///
    /// Returns the engine's failure, a conversion failure, or `Cancelled`.
    pub fn execute<C: Command>(&self, command: &C) -> Result<C::Response> {
        command.execute(self.engine())
    }

    /// Shut the engine down. A shut-down [`LocalEngine`] rejects later commands.
    pub fn shutdown(&self) {
        info!("shutting down engine");
        self.engine.shutdown()
    }
}

impl std::fmt::Debug for StrataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrataClient").finish_non_exhaustive()
    }
}
