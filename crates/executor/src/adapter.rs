//! Type-converting future adapter.
//!
//! A [`FutureAdapter`] sits between an engine future and the caller. It is
//! registered as the engine future's only listener; when the engine future
//! completes, the adapter converts the engine-level value and context into
//! client types, transitions its own terminal cell exactly once, and then
//! notifies its own listeners in registration order.
//!
//! ```text
//!   engine thread                         adapter
//!   ─────────────                         ───────
//!   core.set_success(v) ──► handle() ──► convert_response(v), convert_query_info(i)
//!                                        │
//!                                        ├─ Ok  ─► Success(f(v)), info g(i)
//!                                        └─ Err ─► Failure(e)
//!                                        │
//!                                        └─► listeners (registration order)
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use strata_core::{Completion, Error, FutureListener, Outcome, Result, StrataFuture, WaitStatus};

type Converter<From, To> = Box<dyn Fn(From) -> Result<To> + Send + Sync>;

/// Adapts an engine future of `(CR, CI)` into a client future of `(R, I)`.
///
/// - `CR`/`CI`: engine response and context types
/// - `R`/`I`: client response and context types
///
/// Cancelling the adapter cancels the engine future. Everything else is read
/// from the adapter's own terminal cell, which only the conversion step
/// writes.
pub struct FutureAdapter<CR, CI, R, I> {
    core: Arc<dyn StrataFuture<CR, CI>>,
    convert_response: Converter<CR, R>,
    convert_query_info: Converter<CI, I>,
    notified: AtomicBool,
    completion: Completion<R, I>,
}

impl<CR, CI, R, I> FutureAdapter<CR, CI, R, I>
where
    CR: Clone + Send + Sync + 'static,
    CI: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    /// Create an adapter without registering it.
    ///
    /// Most callers want [`attach`](Self::attach).
    pub fn new(
        core: Arc<dyn StrataFuture<CR, CI>>,
        convert_response: impl Fn(CR) -> Result<R> + Send + Sync + 'static,
        convert_query_info: impl Fn(CI) -> Result<I> + Send + Sync + 'static,
    ) -> Self {
        Self {
            core,
            convert_response: Box::new(convert_response),
            convert_query_info: Box::new(convert_query_info),
            notified: AtomicBool::new(false),
            completion: Completion::new(),
        }
    }

    /// Create an adapter and register it as a listener on `core`.
    ///
    /// If `core` is already terminal the conversion runs before this returns.
    pub fn attach(
        core: Arc<dyn StrataFuture<CR, CI>>,
        convert_response: impl Fn(CR) -> Result<R> + Send + Sync + 'static,
        convert_query_info: impl Fn(CI) -> Result<I> + Send + Sync + 'static,
    ) -> Arc<Self> {
        let adapter = Arc::new(Self::new(
            Arc::clone(&core),
            convert_response,
            convert_query_info,
        ));
        let listener: Arc<dyn FutureListener<CR, CI>> = adapter.clone();
        core.add_listener(listener);
        adapter
    }

    /// The wrapped engine future
    pub fn core(&self) -> &Arc<dyn StrataFuture<CR, CI>> {
        &self.core
    }

    fn convert_success(&self, value: CR, core_info: Option<CI>) -> (Outcome<R>, Option<I>) {
        let converted = catch_unwind(AssertUnwindSafe(|| -> Result<(R, Option<I>)> {
            let response = (self.convert_response)(value)?;
            let info = match core_info {
                Some(info) => Some((self.convert_query_info)(info)?),
                None => None,
            };
            Ok((response, info))
        }));

        match converted {
            Ok(Ok((response, info))) => (Outcome::Success(response), info),
            Ok(Err(e)) => {
                warn!(error = %e, "engine response conversion failed");
                (Outcome::Failure(e), None)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(%message, "engine response conversion panicked");
                (
                    Outcome::Failure(Error::conversion(format!(
                        "conversion panicked: {}",
                        message
                    ))),
                    None,
                )
            }
        }
    }

    /// Context conversion for a future that did not succeed. A failing
    /// conversion only loses the context; the engine's outcome stands.
    fn convert_info_only(&self, core_info: Option<CI>) -> Option<I> {
        let info = core_info?;
        catch_unwind(AssertUnwindSafe(|| (self.convert_query_info)(info)))
            .ok()
            .and_then(|converted| converted.ok())
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "(non-string panic)".to_string())
}

impl<CR, CI, R, I> FutureListener<CR, CI> for FutureAdapter<CR, CI, R, I>
where
    CR: Clone + Send + Sync + 'static,
    CI: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    fn handle(&self, core: &dyn StrataFuture<CR, CI>) {
        if self.notified.swap(true, Ordering::AcqRel) {
            error!("engine future notified its adapter twice");
            panic!("contract violation: engine future completed twice");
        }

        let (outcome, info) = if core.is_success() {
            match core.get_now() {
                Some(value) => self.convert_success(value, core.query_info()),
                None => (
                    Outcome::Failure(Error::internal(
                        "engine future reported success without a value",
                    )),
                    None,
                ),
            }
        } else if core.is_cancelled() {
            (Outcome::Cancelled, self.convert_info_only(core.query_info()))
        } else {
            let cause = core
                .cause()
                .unwrap_or_else(|| Error::internal("engine future failed without a cause"));
            (Outcome::Failure(cause), self.convert_info_only(core.query_info()))
        };

        if self.completion.try_complete(outcome, info, self).is_err() {
            error!("future adapter completed twice");
        }
    }
}

impl<CR, CI, R, I> StrataFuture<R, I> for FutureAdapter<CR, CI, R, I>
where
    CR: Clone + Send + Sync + 'static,
    CI: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    fn cancel(&self) -> bool {
        // A successful cancel notifies this adapter before returning.
        self.core.cancel()
    }

    fn is_cancelled(&self) -> bool {
        self.completion.is_cancelled()
    }

    fn is_done(&self) -> bool {
        self.completion.is_done()
    }

    fn is_success(&self) -> bool {
        self.completion.is_success()
    }

    fn cause(&self) -> Option<Error> {
        self.completion.cause()
    }

    fn get_now(&self) -> Option<R> {
        self.completion.value()
    }

    fn query_info(&self) -> Option<I> {
        self.completion.info()
    }

    fn wait(&self) {
        self.completion.wait()
    }

    fn wait_timeout(&self, timeout: Duration) -> WaitStatus {
        self.completion.wait_timeout(timeout)
    }

    fn add_listener(&self, listener: Arc<dyn FutureListener<R, I>>) {
        self.completion.add_listener(listener, self)
    }

    fn remove_listener(&self, listener: &Arc<dyn FutureListener<R, I>>) -> bool {
        self.completion.remove_listener(listener)
    }
}
