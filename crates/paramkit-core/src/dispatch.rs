#![forbid(unsafe_code)]

//! Deferred notification dispatcher.
//!
//! A [`Dispatcher`] is an explicitly constructed, caller-owned handle:
//! containers configured with [`NotifyMode::Deferred`](crate::NotifyMode)
//! hand their notices to it instead of delivering synchronously. The
//! dispatcher batches notices in a queue and delivers them from a worker
//! thread that is started lazily on the first enqueue, sleeps for a
//! coalescing window so a burst of dependent changes wakes observers only
//! once per window, drains the whole queue, and exits as soon as the
//! queue is empty at the point it would otherwise loop.
//!
//! # Contract
//!
//! - Queue access and the drain handoff share one critical section;
//!   delivery itself runs outside any lock, so observers may freely
//!   enqueue further notices.
//! - A notice enqueued mid-drain may miss that pass but is guaranteed
//!   delivery: the worker re-loops while the queue is non-empty.
//! - [`flush`](Dispatcher::flush) drains synchronously on the calling
//!   thread, which makes the queue testable without timing assumptions.

use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::Duration;

use crate::lock;
use crate::model::core::ModelCore;
use crate::observer::Payload;

/// Configuration for a [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// How long the worker sleeps before each drain pass.
    pub coalescing_window: Duration,
    /// Name given to the worker thread.
    pub thread_name: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            coalescing_window: Duration::from_millis(50),
            thread_name: "paramkit-dispatch".to_string(),
        }
    }
}

/// A queued notification awaiting delivery.
pub(crate) struct Pending {
    pub(crate) subject: Weak<ModelCore>,
    pub(crate) payload: Option<Payload>,
}

struct DispatchState {
    queue: Vec<Pending>,
    worker_running: bool,
}

struct DispatchInner {
    state: Mutex<DispatchState>,
    config: DispatcherConfig,
}

/// Caller-owned deferred notification dispatcher. Cloning yields another
/// handle to the same queue and worker.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatchInner>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("Dispatcher")
            .field("pending", &state.queue.len())
            .field("worker_running", &state.worker_running)
            .finish()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatcherConfig::default())
    }
}

impl Dispatcher {
    /// Create a dispatcher with the given configuration. No thread is
    /// started until the first notice is enqueued.
    #[must_use]
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            inner: Arc::new(DispatchInner {
                state: Mutex::new(DispatchState {
                    queue: Vec::new(),
                    worker_running: false,
                }),
                config,
            }),
        }
    }

    /// Number of notices currently queued.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        lock(&self.inner.state).queue.len()
    }

    /// Deliver every queued notice synchronously on the calling thread.
    pub fn flush(&self) {
        loop {
            let batch = std::mem::take(&mut lock(&self.inner.state).queue);
            if batch.is_empty() {
                return;
            }
            deliver_batch(batch);
        }
    }

    pub(crate) fn enqueue(&self, pending: Pending) {
        let start_worker = {
            let mut state = lock(&self.inner.state);
            state.queue.push(pending);
            if state.worker_running {
                false
            } else {
                state.worker_running = true;
                true
            }
        };
        if start_worker {
            self.spawn_worker();
        }
    }

    fn spawn_worker(&self) {
        let inner = Arc::clone(&self.inner);
        thread::Builder::new()
            .name(inner.config.thread_name.clone())
            .spawn(move || {
                tracing::trace!("dispatch worker started");
                worker_loop(&inner);
                tracing::trace!("dispatch worker stopped");
            })
            .expect("failed to spawn dispatch worker thread");
    }
}

fn worker_loop(inner: &DispatchInner) {
    loop {
        thread::sleep(inner.config.coalescing_window);

        let batch = std::mem::take(&mut lock(&inner.state).queue);
        deliver_batch(batch);

        // Stop only if nothing arrived during delivery; otherwise loop so
        // every enqueue observed here is guaranteed a drain pass.
        let mut state = lock(&inner.state);
        if state.queue.is_empty() {
            state.worker_running = false;
            return;
        }
    }
}

fn deliver_batch(batch: Vec<Pending>) {
    for pending in batch {
        if let Some(core) = pending.subject.upgrade() {
            core.deliver(pending.payload);
        }
    }
}
