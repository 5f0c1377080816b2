#![forbid(unsafe_code)]

//! Observer protocol: notices, the observer capability, and RAII
//! registration guards.
//!
//! Containers hold their observers as `Weak` references; the caller owns
//! the strong `Arc`. Dead entries are pruned lazily at notification time,
//! so teardown is order-independent: dropping an observer (or its
//! [`Registration`] guard) can never leave a dangling reference behind.
//!
//! A [`Notice`] identifies its source by a stable [`ModelId`] rather than
//! a back-pointer, so observers watching several containers can tell them
//! apart without borrowing into container internals.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::model::ModelId;
use crate::model::core::ModelCore;

/// Optional payload attached to a notification.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// A change notification delivered to observers.
#[derive(Clone)]
pub struct Notice {
    /// Stable identity of the notifying container.
    pub source: ModelId,
    /// Name of the notifying container.
    pub name: Arc<str>,
    /// Payload supplied by the notifier, if any.
    pub payload: Option<Payload>,
}

impl fmt::Debug for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notice")
            .field("source", &self.source)
            .field("name", &self.name)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

impl Notice {
    /// Downcast the payload to a concrete type, if present and matching.
    #[must_use]
    pub fn payload_as<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.payload.as_deref().and_then(|p| p.downcast_ref())
    }
}

/// The observer capability: receives a notice per committed change.
///
/// An observer may itself own other containers and propagate further
/// mutations from `receive`; such re-entrant mutations on the *notifying*
/// container are ignored by the pipeline gate.
pub trait Observer: Send + Sync {
    fn receive(&self, notice: &Notice);
}

/// Closure-backed observer used by the `subscribe` convenience API.
pub(crate) struct ClosureObserver<F: Fn(&Notice) + Send + Sync> {
    callback: F,
}

impl<F: Fn(&Notice) + Send + Sync> ClosureObserver<F> {
    pub(crate) fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F: Fn(&Notice) + Send + Sync> Observer for ClosureObserver<F> {
    fn receive(&self, notice: &Notice) {
        (self.callback)(notice);
    }
}

/// RAII guard for a registered observer.
///
/// Dropping the guard unregisters the observer from its container (if the
/// container is still alive) and releases the strong reference keeping
/// the observer callable.
pub struct Registration {
    observer: Option<Arc<dyn Observer>>,
    subject: Weak<ModelCore>,
}

impl Registration {
    pub(crate) fn new(observer: Arc<dyn Observer>, subject: Weak<ModelCore>) -> Self {
        Self {
            observer: Some(observer),
            subject,
        }
    }

    /// Detach without unregistering: the observer stays registered for the
    /// lifetime of the returned `Arc`.
    #[must_use]
    pub fn into_observer(mut self) -> Arc<dyn Observer> {
        self.subject = Weak::new();
        self.observer
            .take()
            .unwrap_or_else(|| unreachable!("registration observer taken twice"))
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration").finish_non_exhaustive()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let (Some(observer), Some(core)) = (self.observer.take(), self.subject.upgrade()) {
            core.unregister(&observer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn payload_downcast() {
        let notice = Notice {
            source: ModelId::next(),
            name: Arc::from("n"),
            payload: Some(Arc::new(42u32)),
        };
        assert_eq!(notice.payload_as::<u32>(), Some(&42));
        assert_eq!(notice.payload_as::<String>(), None);
    }

    #[test]
    fn missing_payload_downcasts_to_none() {
        let notice = Notice {
            source: ModelId::next(),
            name: Arc::from("n"),
            payload: None,
        };
        assert_eq!(notice.payload_as::<u32>(), None);
    }

    #[test]
    fn registration_drop_unsubscribes() {
        let model = Model::new("m", 0);
        let hits = Arc::new(AtomicU32::new(0));
        let hits_cl = Arc::clone(&hits);
        let reg = model.subscribe(move |_| {
            hits_cl.fetch_add(1, Ordering::SeqCst);
        });

        model.assign(1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        drop(reg);
        model.assign(2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn into_observer_keeps_subscription_alive() {
        let model = Model::new("m", 0);
        let hits = Arc::new(AtomicU32::new(0));
        let hits_cl = Arc::clone(&hits);
        let observer = model
            .subscribe(move |_| {
                hits_cl.fetch_add(1, Ordering::SeqCst);
            })
            .into_observer();

        model.assign(1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        drop(observer);
        model.assign(2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn notice_reports_source_identity() {
        let a = Model::new("a", 0);
        let b = Model::new("b", 0);
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

        let seen_cl = Arc::clone(&seen);
        let _ra = a.subscribe(move |n| seen_cl.lock().unwrap().push((n.source, n.name.to_string())));
        let seen_cl = Arc::clone(&seen);
        let _rb = b.subscribe(move |n| seen_cl.lock().unwrap().push((n.source, n.name.to_string())));

        a.assign(1);
        b.assign(1);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (a.id(), "a".to_string()));
        assert_eq!(seen[1], (b.id(), "b".to_string()));
    }
}
