#![forbid(unsafe_code)]

//! Base parameter: a model plus a default value and a relevance flag.
//!
//! The relevance flag answers "is this value currently meaningful in
//! context". It can be hard-set, or delegated to a boolean parameter: the
//! delegated flag mirrors the delegate's value on every notification and
//! re-notifies this parameter's own observers, so relevance changes flow
//! through the same observation channel as value changes.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use paramkit_core::{Model, ModelId, Notice, NotifyMode, Registration};

use crate::lock;

struct DelegateLink {
    delegate: Model<bool>,
    _registration: Registration,
}

struct RelevanceState {
    relevant: bool,
    delegate: Option<DelegateLink>,
}

struct ParamExtra<T> {
    default_value: T,
    relevance: Mutex<RelevanceState>,
}

/// A named parameter: a value container with a construction-time default
/// and a relevance flag. Cheap to clone; clones share the parameter.
pub struct Parameter<T> {
    model: Model<T>,
    extra: Arc<ParamExtra<T>>,
}

impl<T> Clone for Parameter<T> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            extra: Arc::clone(&self.extra),
        }
    }
}

impl<T> fmt::Debug for Parameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("id", &self.model.id())
            .field("name", &self.model.name())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + PartialEq> Parameter<T> {
    /// Create a parameter whose initial value is its default.
    #[must_use]
    pub fn new(name: &str, default_value: T) -> Self {
        Self::with_mode(name, default_value, NotifyMode::Immediate)
    }

    /// Create a parameter with the given notification mode.
    #[must_use]
    pub fn with_mode(name: &str, default_value: T, mode: NotifyMode) -> Self {
        Self {
            model: Model::with_mode(name, default_value.clone(), mode),
            extra: Arc::new(ParamExtra {
                default_value,
                relevance: Mutex::new(RelevanceState {
                    relevant: true,
                    delegate: None,
                }),
            }),
        }
    }

    /// The underlying value container.
    #[must_use]
    pub fn model(&self) -> &Model<T> {
        &self.model
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.model.name()
    }

    #[must_use]
    pub fn id(&self) -> ModelId {
        self.model.id()
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.model.get()
    }

    /// Propose a value through the validation pipeline.
    pub fn assign(&self, value: T) -> bool {
        self.model.assign(value)
    }

    /// Register a closure observer on this parameter.
    #[must_use]
    pub fn subscribe<F>(&self, callback: F) -> Registration
    where
        F: Fn(&Notice) + Send + Sync + 'static,
    {
        self.model.subscribe(callback)
    }

    /// The default value fixed at construction.
    #[must_use]
    pub fn default_value(&self) -> T {
        self.extra.default_value.clone()
    }

    /// Whether the current value equals the default.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.model.with(|value| *value == self.extra.default_value)
    }

    /// Set the value back to the default directly, bypassing rules and
    /// voter, notifying if it actually changed.
    pub fn reset_to_default(&self) {
        self.model.force_assign(self.extra.default_value.clone());
    }

    /// Whether this parameter is currently meaningful in context.
    #[must_use]
    pub fn is_relevant(&self) -> bool {
        lock(&self.extra.relevance).relevant
    }

    /// Set the relevance flag. While delegated, the assignment is
    /// forwarded to the delegate (the mirrored value flows back through
    /// the delegation observer); otherwise a real flip notifies this
    /// parameter's observers.
    pub fn set_relevance(&self, relevant: bool) {
        let forward = {
            let mut state = lock(&self.extra.relevance);
            match &state.delegate {
                Some(link) => Some(link.delegate.clone()),
                None => {
                    if state.relevant == relevant {
                        return;
                    }
                    state.relevant = relevant;
                    None
                }
            }
        };
        match forward {
            Some(delegate) => {
                delegate.assign(relevant);
            }
            None => {
                self.model.mark_changed();
                self.model.notify_all();
            }
        }
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Parameter<T> {
    /// Delegate the relevance flag to a boolean parameter. The flag
    /// immediately takes the delegate's current value and mirrors every
    /// subsequent change, re-notifying this parameter's observers.
    pub fn delegate_relevance(&self, delegate: &Parameter<bool>) {
        let weak_extra: Weak<ParamExtra<T>> = Arc::downgrade(&self.extra);
        let own = self.model.clone();
        let source = delegate.model.clone();

        let registration = delegate.model.subscribe_with_initial(move |_| {
            let Some(extra) = weak_extra.upgrade() else {
                return;
            };
            let mirrored = source.get();
            let flipped = {
                let mut state = lock(&extra.relevance);
                if state.relevant == mirrored {
                    false
                } else {
                    state.relevant = mirrored;
                    true
                }
            };
            if flipped {
                own.mark_changed();
                own.notify_all();
            }
        });

        lock(&self.extra.relevance).delegate = Some(DelegateLink {
            delegate: delegate.model.clone(),
            _registration: registration,
        });
    }

    /// Drop the relevance delegation, keeping the last mirrored value as
    /// the self-held flag.
    pub fn undelegate_relevance(&self) {
        lock(&self.extra.relevance).delegate = None;
    }
}
