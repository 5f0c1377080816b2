#![forbid(unsafe_code)]

//! Core engine of the paramkit reactive value system.
//!
//! A [`Model<T>`] is a named, shared, change-tracked value container.
//! Observers register with a container and receive a [`Notice`] whenever a
//! mutation commits. Every proposed mutation runs through a validation
//! pipeline: an ordered list of [`AssignRule`]s propagates derived changes
//! into dependent containers, and an optional [`Voter`] plus the rules'
//! own checks decide whether the edit commits or rolls back to the exact
//! pre-mutation value.
//!
//! Notification delivery is configurable per container: immediate
//! (synchronous, on the mutating thread) or deferred through a caller-owned
//! [`Dispatcher`] that batches notices on a lazily started worker thread.
//!
//! # Invariants
//!
//! 1. A container's `changed` flag is true only between a committed
//!    mutation and the completion of notification handoff.
//! 2. The rollback snapshot always holds the value from immediately before
//!    the in-flight mutation attempt, however many rules ran in between.
//! 3. The pipeline is not reentrant: a mutation attempt arriving while one
//!    is in flight on the same container is silently ignored.
//! 4. A rejected mutation is a normal outcome (`false`), never an error.

pub mod dispatch;
pub mod model;
pub mod observer;
pub mod rules;

pub use dispatch::{Dispatcher, DispatcherConfig};
pub use model::{Model, ModelId, NotifyMode, Origin};
pub use observer::{Notice, Observer, Payload, Registration};
pub use rules::{AssignRule, Voter};

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering the guard if a panicking holder poisoned it.
///
/// Container state stays structurally valid across panics (all writes are
/// plain field stores), so continuing past poison is safe here.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
