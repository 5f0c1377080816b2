#![forbid(unsafe_code)]

//! Occurrence signals built on the container notification machinery.
//!
//! An [`Event`] carries no value; signalling it marks the underlying
//! container changed and notifies every observer, honoring the notify
//! mode. [`TypedEvent<T>`] additionally delivers a value as the notice
//! payload.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use paramkit_core::{Model, ModelId, Notice, NotifyMode, Payload, Registration};

/// A named, value-less signal source.
#[derive(Clone)]
pub struct Event {
    model: Model<()>,
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.model.id())
            .field("name", &self.model.name())
            .finish()
    }
}

impl Event {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::with_mode(name, NotifyMode::Immediate)
    }

    #[must_use]
    pub fn with_mode(name: &str, mode: NotifyMode) -> Self {
        Self {
            model: Model::with_mode(name, (), mode),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.model.name()
    }

    #[must_use]
    pub fn id(&self) -> ModelId {
        self.model.id()
    }

    pub fn set_notify_mode(&self, mode: NotifyMode) {
        self.model.set_notify_mode(mode);
    }

    /// Notify every observer of one occurrence.
    pub fn signal(&self) {
        self.model.mark_changed();
        self.model.notify_all();
    }

    /// Notify every observer, attaching a payload.
    pub fn signal_with(&self, payload: Payload) {
        self.model.mark_changed();
        self.model.notify_with_payload(payload);
    }

    #[must_use]
    pub fn subscribe<F>(&self, callback: F) -> Registration
    where
        F: Fn(&Notice) + Send + Sync + 'static,
    {
        self.model.subscribe(callback)
    }
}

/// A signal source that delivers a value of `T` with each occurrence.
pub struct TypedEvent<T> {
    event: Event,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for TypedEvent<T> {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedEvent")
            .field("name", &self.event.name())
            .finish_non_exhaustive()
    }
}

impl<T: Send + Sync + 'static> TypedEvent<T> {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::with_mode(name, NotifyMode::Immediate)
    }

    #[must_use]
    pub fn with_mode(name: &str, mode: NotifyMode) -> Self {
        Self {
            event: Event::with_mode(name, mode),
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.event.name()
    }

    #[must_use]
    pub fn id(&self) -> ModelId {
        self.event.id()
    }

    /// Deliver `value` to every observer as the notice payload.
    pub fn signal(&self, value: T) {
        self.event.signal_with(Arc::new(value));
    }

    /// Register a closure receiving the delivered value.
    #[must_use]
    pub fn subscribe<F>(&self, callback: F) -> Registration
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.event.subscribe(move |notice| {
            if let Some(value) = notice.payload_as::<T>() {
                callback(value);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramkit_core::{Dispatcher, DispatcherConfig};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[test]
    fn signal_reaches_every_observer() {
        let event = Event::new("tick");
        let hits = Arc::new(AtomicU32::new(0));
        let a = Arc::clone(&hits);
        let _ra = event.subscribe(move |_| {
            a.fetch_add(1, Ordering::SeqCst);
        });
        let b = Arc::clone(&hits);
        let _rb = event.subscribe(move |_| {
            b.fetch_add(1, Ordering::SeqCst);
        });

        event.signal();
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        event.signal();
        assert_eq!(hits.load(Ordering::SeqCst), 4, "each occurrence re-fires");
    }

    #[test]
    fn signal_with_payload() {
        let event = Event::new("tick");
        let seen = Arc::new(std::sync::Mutex::new(None));
        let seen_cl = Arc::clone(&seen);
        let _reg = event.subscribe(move |n| {
            *seen_cl.lock().unwrap() = n.payload_as::<u32>().copied();
        });

        event.signal_with(Arc::new(7u32));
        assert_eq!(*seen.lock().unwrap(), Some(7));
    }

    #[test]
    fn typed_event_delivers_values() {
        let event = TypedEvent::<String>::new("msg");
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_cl = Arc::clone(&seen);
        let _reg = event.subscribe(move |value: &String| {
            seen_cl.lock().unwrap().push(value.clone());
        });

        event.signal("hello".to_string());
        event.signal("again".to_string());
        assert_eq!(*seen.lock().unwrap(), vec!["hello", "again"]);
    }

    #[test]
    fn deferred_event_waits_for_the_dispatcher() {
        let dispatcher = Dispatcher::new(DispatcherConfig {
            coalescing_window: Duration::from_secs(60),
            thread_name: "test-dispatch".to_string(),
        });
        let event = Event::with_mode("tick", NotifyMode::Deferred(dispatcher.clone()));
        let hits = Arc::new(AtomicU32::new(0));
        let hits_cl = Arc::clone(&hits);
        let _reg = event.subscribe(move |_| {
            hits_cl.fetch_add(1, Ordering::SeqCst);
        });

        event.signal();
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        dispatcher.flush();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
