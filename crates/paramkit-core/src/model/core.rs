#![forbid(unsafe_code)]

//! Type-erased container core shared by the dispatcher queue, observer
//! registrations, and every typed `Model<T>` handle.

use std::ptr;
use std::sync::{Arc, Mutex, Weak};

use crate::dispatch::Pending;
use crate::lock;
use crate::model::{ModelId, NotifyMode};
use crate::observer::{Notice, Observer, Payload};

/// Identity, name, observer list, and delivery mode of one container.
///
/// Everything value-typed lives in `Model<T>`; this part is what a
/// deferred notice and a `Registration` guard can hold on to weakly
/// without knowing `T`.
pub(crate) struct ModelCore {
    id: ModelId,
    name: Arc<str>,
    observers: Mutex<Vec<Weak<dyn Observer>>>,
    mode: Mutex<NotifyMode>,
}

impl ModelCore {
    pub(crate) fn new(name: &str, mode: NotifyMode) -> Self {
        Self {
            id: ModelId::next(),
            name: Arc::from(name),
            observers: Mutex::new(Vec::new()),
            mode: Mutex::new(mode),
        }
    }

    pub(crate) fn id(&self) -> ModelId {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_mode(&self, mode: NotifyMode) {
        *lock(&self.mode) = mode;
    }

    /// Add an observer unless the very same allocation is already
    /// registered.
    pub(crate) fn register(&self, observer: &Arc<dyn Observer>) {
        let mut observers = lock(&self.observers);
        let already = observers
            .iter()
            .any(|known| ptr::addr_eq(known.as_ptr(), Arc::as_ptr(observer)));
        if !already {
            observers.push(Arc::downgrade(observer));
        }
    }

    pub(crate) fn unregister(&self, observer: &Arc<dyn Observer>) {
        lock(&self.observers)
            .retain(|known| !ptr::addr_eq(known.as_ptr(), Arc::as_ptr(observer)));
    }

    /// Route a notice through the configured delivery mode.
    pub(crate) fn notify(self: &Arc<Self>, payload: Option<Payload>) {
        let mode = lock(&self.mode).clone();
        match mode {
            NotifyMode::Immediate => self.deliver(payload),
            NotifyMode::Deferred(dispatcher) => dispatcher.enqueue(Pending {
                subject: Arc::downgrade(self),
                payload,
            }),
        }
    }

    /// Deliver one payload-free notice to a single observer.
    pub(crate) fn deliver_to(&self, observer: &Arc<dyn Observer>) {
        observer.receive(&Notice {
            source: self.id,
            name: Arc::clone(&self.name),
            payload: None,
        });
    }

    /// Deliver to every live observer, pruning dead entries. Runs with no
    /// lock held, so observers may register, unregister, or mutate freely.
    pub(crate) fn deliver(&self, payload: Option<Payload>) {
        let snapshot: Vec<Arc<dyn Observer>> = {
            let mut observers = lock(&self.observers);
            observers.retain(|known| known.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        let notice = Notice {
            source: self.id,
            name: Arc::clone(&self.name),
            payload,
        };
        for observer in snapshot {
            observer.receive(&notice);
        }
    }
}
