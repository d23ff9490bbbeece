//! Future contract shared by engines and client adapters.
//!
//! A [`StrataFuture`] is a handle to the eventual outcome of one submitted
//! operation. It can be polled, waited on with or without a bound, cancelled
//! before it starts, and observed through [`FutureListener`]s.
//!
//! Both sides of the client are built on [`Completion`], a write-once terminal
//! cell:
//!
//! ```text
//!            try_complete (exactly once)
//!   Pending ─────────────────────────────► Success(V) | Failure(Error) | Cancelled
//!      │                                         │
//!      └─ add_listener: queued                   └─ add_listener: invoked now
//! ```
//!
//! Listeners queued while pending are invoked after the transition, outside
//! the lock, in registration order.

use parking_lot::{Condvar, Mutex};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, warn};

use crate::error::{AlreadyCompleted, Error, Result};

/// Result of a bounded wait.
///
/// A timeout is not a failure: the future is untouched and may still
/// complete.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    /// The future reached a terminal state
    Completed,
    /// The bound elapsed first
    TimedOut,
}

/// Callback invoked exactly once when a future reaches its terminal state.
pub trait FutureListener<V, I>: Send + Sync {
    /// Called with the completed future
    fn handle(&self, future: &dyn StrataFuture<V, I>);
}

impl<V, I, F> FutureListener<V, I> for F
where
    F: Fn(&dyn StrataFuture<V, I>) + Send + Sync,
{
    fn handle(&self, future: &dyn StrataFuture<V, I>) {
        self(future)
    }
}

/// Handle to the eventual outcome of an operation.
///
/// `V` is the response type and `I` the context the operation was addressed
/// to.
pub trait StrataFuture<V, I>: Send + Sync {
    /// Try to cancel.
    ///
    /// Succeeds only if the operation has not started. Returns `true` if this
    /// call cancelled the future.
    fn cancel(&self) -> bool;

    /// True if the future was cancelled
    fn is_cancelled(&self) -> bool;

    /// True once the future is terminal (success, failure or cancelled)
    fn is_done(&self) -> bool;

    /// True if the future completed successfully
    fn is_success(&self) -> bool;

    /// The failure cause, if the future failed
    fn cause(&self) -> Option<Error>;

    /// The value, if the future succeeded. Never blocks.
    fn get_now(&self) -> Option<V>;

    /// The context of the operation, if known
    fn query_info(&self) -> Option<I>;

    /// Block until terminal
    fn wait(&self);

    /// Block until terminal or until `timeout` elapses
    fn wait_timeout(&self, timeout: Duration) -> WaitStatus;

    /// Register a listener.
    ///
    /// Invoked synchronously if the future is already terminal, otherwise
    /// once on completion.
    fn add_listener(&self, listener: Arc<dyn FutureListener<V, I>>);

    /// Unregister a pending listener. Returns `true` if it was registered.
    fn remove_listener(&self, listener: &Arc<dyn FutureListener<V, I>>) -> bool;

    /// Block until terminal, then return the value or the failure.
    ///
    /// A cancelled future yields `Error::Cancelled`.
    fn get(&self) -> Result<V> {
        self.wait();
        outcome_of(self)
    }

    /// Like [`get`](Self::get) but bounded. `None` means the bound elapsed.
    fn get_timeout(&self, timeout: Duration) -> Option<Result<V>> {
        match self.wait_timeout(timeout) {
            WaitStatus::Completed => Some(outcome_of(self)),
            WaitStatus::TimedOut => None,
        }
    }
}

fn outcome_of<V, I, F: StrataFuture<V, I> + ?Sized>(future: &F) -> Result<V> {
    if let Some(value) = future.get_now() {
        return Ok(value);
    }
    if future.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Err(future
        .cause()
        .unwrap_or_else(|| Error::internal("terminal future has neither value nor cause")))
}

/// Terminal outcome of a future.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<V> {
    /// Completed with a value
    Success(V),
    /// Completed with an error
    Failure(Error),
    /// Cancelled before it started
    Cancelled,
}

struct CompletionState<V, I> {
    outcome: Option<Outcome<V>>,
    info: Option<I>,
    listeners: Vec<Arc<dyn FutureListener<V, I>>>,
}

/// Write-once terminal cell with listener dispatch.
///
/// One writer transitions the cell with [`try_complete`](Self::try_complete);
/// any number of readers observe the immutable outcome afterwards. A second
/// transition is rejected and leaves the first outcome in place.
pub struct Completion<V, I> {
    state: Mutex<CompletionState<V, I>>,
    done: Condvar,
}

impl<V, I> Default for Completion<V, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, I> Completion<V, I> {
    /// A pending cell
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CompletionState {
                outcome: None,
                info: None,
                listeners: Vec::new(),
            }),
            done: Condvar::new(),
        }
    }

    /// Transition to terminal and notify listeners.
    ///
    /// `info` replaces the stored context if given. `future` is the handle
    /// passed to listeners.
    pub fn try_complete(
        &self,
        outcome: Outcome<V>,
        info: Option<I>,
        future: &dyn StrataFuture<V, I>,
    ) -> std::result::Result<(), AlreadyCompleted> {
        let listeners = {
            let mut state = self.state.lock();
            if state.outcome.is_some() {
                return Err(AlreadyCompleted);
            }
            state.outcome = Some(outcome);
            if info.is_some() {
                state.info = info;
            }
            std::mem::take(&mut state.listeners)
        };
        self.notify(listeners, future);
        Ok(())
    }

    /// Cancel unless `started` is set, checked under the cell lock.
    fn cancel_unless(&self, started: &AtomicBool, future: &dyn StrataFuture<V, I>) -> bool {
        let listeners = {
            let mut state = self.state.lock();
            if state.outcome.is_some() || started.load(Ordering::Acquire) {
                return false;
            }
            state.outcome = Some(Outcome::Cancelled);
            std::mem::take(&mut state.listeners)
        };
        self.notify(listeners, future);
        true
    }

    fn notify(
        &self,
        listeners: Vec<Arc<dyn FutureListener<V, I>>>,
        future: &dyn StrataFuture<V, I>,
    ) {
        self.done.notify_all();
        for listener in listeners {
            dispatch(listener.as_ref(), future);
        }
    }

    /// Queue a listener, or invoke it now if terminal.
    pub fn add_listener(
        &self,
        listener: Arc<dyn FutureListener<V, I>>,
        future: &dyn StrataFuture<V, I>,
    ) {
        {
            let mut state = self.state.lock();
            if state.outcome.is_none() {
                state.listeners.push(listener);
                return;
            }
        }
        dispatch(listener.as_ref(), future);
    }

    /// Drop a queued listener. Returns `true` if it was queued.
    pub fn remove_listener(&self, listener: &Arc<dyn FutureListener<V, I>>) -> bool {
        let target = Arc::as_ptr(listener) as *const ();
        let mut state = self.state.lock();
        let before = state.listeners.len();
        state
            .listeners
            .retain(|l| Arc::as_ptr(l) as *const () != target);
        state.listeners.len() != before
    }

    /// True once terminal
    pub fn is_done(&self) -> bool {
        self.state.lock().outcome.is_some()
    }

    /// True if terminal with a value
    pub fn is_success(&self) -> bool {
        matches!(self.state.lock().outcome, Some(Outcome::Success(_)))
    }

    /// True if cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self.state.lock().outcome, Some(Outcome::Cancelled))
    }

    /// The failure cause, if failed
    pub fn cause(&self) -> Option<Error> {
        match &self.state.lock().outcome {
            Some(Outcome::Failure(e)) => Some(e.clone()),
            _ => None,
        }
    }

    /// Block until terminal
    pub fn wait(&self) {
        let mut state = self.state.lock();
        while state.outcome.is_none() {
            self.done.wait(&mut state);
        }
    }

    /// Block until terminal or until `timeout` elapses
    pub fn wait_timeout(&self, timeout: Duration) -> WaitStatus {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while state.outcome.is_none() {
            if self.done.wait_until(&mut state, deadline).timed_out() {
                return if state.outcome.is_some() {
                    WaitStatus::Completed
                } else {
                    WaitStatus::TimedOut
                };
            }
        }
        WaitStatus::Completed
    }
}

impl<V: Clone, I> Completion<V, I> {
    /// The value, if terminal with a value
    pub fn value(&self) -> Option<V> {
        match &self.state.lock().outcome {
            Some(Outcome::Success(v)) => Some(v.clone()),
            _ => None,
        }
    }
}

impl<V, I: Clone> Completion<V, I> {
    /// The stored context, if any
    pub fn info(&self) -> Option<I> {
        self.state.lock().info.clone()
    }
}

/// Invoke one listener. A panic is logged and contained so the remaining
/// listeners still run and the completing thread is unaffected.
fn dispatch<V, I>(listener: &dyn FutureListener<V, I>, future: &dyn StrataFuture<V, I>) {
    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| listener.handle(future))) {
        let message = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "(non-string panic)".to_string());
        error!(%message, "future listener panicked");
    }
}

/// Engine-side future.
///
/// Created with the context of the operation it tracks; the engine marks it
/// started with [`try_start`](Self::try_start) and completes it with
/// [`set_success`](Self::set_success) or [`set_failure`](Self::set_failure).
pub struct DefaultFuture<V, I> {
    info: I,
    started: AtomicBool,
    completion: Completion<V, I>,
}

impl<V, I> DefaultFuture<V, I>
where
    V: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    /// A pending future for an operation addressed to `info`
    pub fn new(info: I) -> Arc<Self> {
        Arc::new(Self {
            info,
            started: AtomicBool::new(false),
            completion: Completion::new(),
        })
    }

    /// Claim the operation for execution.
    ///
    /// Returns `false` if the future was cancelled or already terminal, in
    /// which case the engine must not run the operation. After a successful
    /// claim, [`cancel`](StrataFuture::cancel) fails.
    pub fn try_start(&self) -> bool {
        // Same lock as cancel, so exactly one of them wins.
        let state = self.completion.state.lock();
        if state.outcome.is_some() {
            return false;
        }
        !self.started.swap(true, Ordering::AcqRel)
    }

    /// True once claimed by [`try_start`](Self::try_start)
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Complete with a value
    pub fn set_success(&self, value: V) -> std::result::Result<(), AlreadyCompleted> {
        self.finish(Outcome::Success(value))
    }

    /// Complete with an error
    pub fn set_failure(&self, error: Error) -> std::result::Result<(), AlreadyCompleted> {
        self.finish(Outcome::Failure(error))
    }

    fn finish(&self, outcome: Outcome<V>) -> std::result::Result<(), AlreadyCompleted> {
        let result = self.completion.try_complete(outcome, None, self);
        if result.is_err() {
            warn!("rejected second completion of an engine future");
        }
        result
    }
}

impl<V, I> StrataFuture<V, I> for DefaultFuture<V, I>
where
    V: Clone + Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
{
    fn cancel(&self) -> bool {
        self.completion.cancel_unless(&self.started, self)
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

    fn get_now(&self) -> Option<V> {
        self.completion.value()
    }

    fn query_info(&self) -> Option<I> {
        Some(self.info.clone())
    }

    fn wait(&self) {
        self.completion.wait()
    }

    fn wait_timeout(&self, timeout: Duration) -> WaitStatus {
        self.completion.wait_timeout(timeout)
    }

    fn add_listener(&self, listener: Arc<dyn FutureListener<V, I>>) {
        self.completion.add_listener(listener, self)
    }

    fn remove_listener(&self, listener: &Arc<dyn FutureListener<V, I>>) -> bool {
        self.completion.remove_listener(listener)
    }
}
