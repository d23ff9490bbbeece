//! Fixed-size worker pool for engine completions.
//!
//! Jobs run in submission order on a fixed set of threads. The queue is
//! bounded: a full queue or a shut-down pool rejects new jobs instead of
//! blocking the submitting caller.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;
use tracing::error;

/// Why a job was not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolRejection {
    /// The queue is at `max_queue_depth`
    #[error("engine queue is full")]
    QueueFull,
    /// `shutdown` has been called
    #[error("engine is shut down")]
    ShutDown,
}

/// Pool metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Jobs waiting in the queue.
    pub queue_depth: usize,
    /// Jobs currently running.
    pub active_jobs: usize,
    /// Jobs finished since creation, including ones that panicked.
    pub jobs_completed: u64,
    /// Number of worker threads.
    pub worker_count: usize,
}

type Job = Box<dyn FnOnce() + Send>;

struct PoolInner {
    queue: Mutex<VecDeque<Job>>,
    work_ready: Condvar,
    idle: Condvar,
    shutdown: AtomicBool,
    queue_depth: AtomicUsize,
    active_jobs: AtomicUsize,
    jobs_completed: AtomicU64,
    max_queue_depth: usize,
}

/// Worker threads draining a bounded FIFO queue.
pub struct WorkerPool {
    inner: Arc<PoolInner>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    num_threads: usize,
}

impl WorkerPool {
    /// Start `num_threads` workers named `{name_prefix}-0`, `{name_prefix}-1`, ...
    pub fn new(name_prefix: &str, num_threads: usize, max_queue_depth: usize) -> Self {
        let inner = Arc::new(PoolInner {
            queue: Mutex::new(VecDeque::new()),
            work_ready: Condvar::new(),
            idle: Condvar::new(),
            shutdown: AtomicBool::new(false),
            queue_depth: AtomicUsize::new(0),
            active_jobs: AtomicUsize::new(0),
            jobs_completed: AtomicU64::new(0),
            max_queue_depth,
        });

        let mut workers = Vec::with_capacity(num_threads);
        for i in 0..num_threads {
            let inner = Arc::clone(&inner);
            let handle = std::thread::Builder::new()
                .name(format!("{}-{}", name_prefix, i))
                .spawn(move || worker_loop(&inner))
                .expect("failed to spawn engine worker thread");
            workers.push(handle);
        }

        Self {
            inner,
            workers: Mutex::new(workers),
            num_threads,
        }
    }

    /// Queue a job.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> Result<(), PoolRejection> {
        {
            // Checked under the queue lock: a worker only exits after
            // seeing the flag with an empty queue under the same lock.
            let mut queue = self.inner.queue.lock();
            if self.inner.shutdown.load(Ordering::Acquire) {
                return Err(PoolRejection::ShutDown);
            }
            if queue.len() >= self.inner.max_queue_depth {
                return Err(PoolRejection::QueueFull);
            }
            queue.push_back(Box::new(job));
            self.inner.queue_depth.store(queue.len(), Ordering::Release);
        }

        self.inner.work_ready.notify_one();
        Ok(())
    }

    /// Block until the queue is empty and no job is running.
    ///
    /// Workers keep running afterwards.
    pub fn drain(&self) {
        let mut queue = self.inner.queue.lock();
        while !queue.is_empty() || self.inner.active_jobs.load(Ordering::Acquire) > 0 {
            self.inner.idle.wait(&mut queue);
        }
    }

    /// Stop accepting jobs, run what is queued, and join the workers.
    ///
    /// Idempotent.
    pub fn shutdown(&self) {
        // Set and notify under the lock: a worker between its shutdown check
        // and its wait holds this lock, so it cannot miss the wakeup.
        {
            let _queue = self.inner.queue.lock();
            self.inner.shutdown.store(true, Ordering::Release);
            self.inner.work_ready.notify_all();
        }

        let current = std::thread::current().id();
        let mut workers = self.workers.lock();
        for handle in workers.drain(..) {
            // A worker cannot join itself.
            if handle.thread().id() != current {
                let _ = handle.join();
            }
        }
    }

    /// True once `shutdown` has been called
    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    /// Snapshot of pool metrics
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            queue_depth: self.inner.queue_depth.load(Ordering::Relaxed),
            active_jobs: self.inner.active_jobs.load(Ordering::Relaxed),
            jobs_completed: self.inner.jobs_completed.load(Ordering::Relaxed),
            worker_count: self.num_threads,
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Decrements `active_jobs` on drop, even if the job panicked.
struct ActiveJobGuard<'a> {
    inner: &'a PoolInner,
}

impl Drop for ActiveJobGuard<'_> {
    fn drop(&mut self) {
        self.inner.jobs_completed.fetch_add(1, Ordering::Relaxed);
        let prev_active = self.inner.active_jobs.fetch_sub(1, Ordering::Release);

        if prev_active == 1 {
            let queue = self.inner.queue.lock();
            if queue.is_empty() {
                self.inner.idle.notify_all();
            }
        }
    }
}

fn worker_loop(inner: &PoolInner) {
    loop {
        let job = {
            let mut queue = inner.queue.lock();
            loop {
                if let Some(job) = queue.pop_front() {
                    inner.queue_depth.store(queue.len(), Ordering::Release);
                    inner.active_jobs.fetch_add(1, Ordering::Release);
                    break job;
                }
                if inner.shutdown.load(Ordering::Acquire) {
                    return;
                }
                inner.work_ready.wait(&mut queue);
            }
        };

        let _guard = ActiveJobGuard { inner };

        if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)) {
            error!(
                "engine job panicked: {:?}",
                e.downcast_ref::<&str>().copied().unwrap_or("(non-string panic)")
            );
        }
    }
}
