//! Test modules for the executor crate.

use parking_lot::Mutex;
use std::sync::Arc;

use strata_core::{DefaultFuture, Engine, EngineFuture, Operation, QueryInfo, Response, Result};


type PendingFuture = Arc<DefaultFuture<Response, QueryInfo>>;

/// Engine that records submissions and completes them only when told to.
#[derive(Default)]
pub(crate) struct ManualEngine {
    submitted: Mutex<Vec<(Operation, PendingFuture)>>,
}

impl ManualEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn submitted_count(&self) -> usize {
        self.submitted.lock().len()
    }

    pub(crate) fn operation(&self, index: usize) -> Operation {
        self.submitted.lock()[index].0.clone()
    }

    pub(crate) fn future(&self, index: usize) -> PendingFuture {
        Arc::clone(&self.submitted.lock()[index].1)
    }

    /// Start and complete submission `index` on the calling thread.
    pub(crate) fn complete(&self, index: usize, result: Result<Response>) {
        let future = self.future(index);
        assert!(future.try_start(), "submission {} was cancelled", index);
        match result {
            Ok(response) => future.set_success(response).unwrap(),
            Err(e) => future.set_failure(e).unwrap(),
        }
    }
}

impl Engine for ManualEngine {
    fn execute(&self, operation: Operation) -> EngineFuture {
        let future: PendingFuture = DefaultFuture::new(operation.query_info());
        self.submitted
            .lock()
            .push((operation, Arc::clone(&future)));
        future
    }
}
