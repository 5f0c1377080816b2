#![forbid(unsafe_code)]

//! Enumerated parameters: discrete values restricted to a dynamically
//! narrowable valid range.
//!
//! The full range is fixed at construction; the valid subset is
//! recomputed on every query through an optional [`EnumLimiter`]. If the
//! recomputed range excludes the current value and is non-empty, the
//! value is force-reset to the range's first element. That reset is an
//! internal corrective set, not a user edit: it bypasses rules and voter
//! and emits only a change notification.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use paramkit_core::{Model, ModelId, Notice, NotifyMode, Registration};
use paramkit_util::VarArray;

use crate::lock;
use crate::parameter::Parameter;

/// Narrows the valid subset of an enumeration's full range.
pub trait EnumLimiter: Send + Sync {
    /// Remove (or reorder) entries of `range`, which starts as a copy of
    /// the full range.
    fn limit_range(&self, source: &EnumParameter, range: &mut VarArray<i32>);
}

/// Bidirectional string translation for enumeration values.
pub trait EnumTranslator: Send + Sync {
    fn to_value(&self, text: &str) -> Option<i32>;
    fn to_text(&self, value: i32) -> String;
}

struct EnumExtra {
    full_range: VarArray<i32>,
    limiter: Mutex<Option<Weak<dyn EnumLimiter>>>,
    translator: Mutex<Option<Arc<dyn EnumTranslator>>>,
}

/// An `i32`-valued parameter whose assignments are restricted to a
/// recomputed valid range.
#[derive(Clone)]
pub struct EnumParameter {
    param: Parameter<i32>,
    extra: Arc<EnumExtra>,
}

impl fmt::Debug for EnumParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumParameter")
            .field("name", &self.param.name())
            .field("full_range", &self.extra.full_range)
            .finish_non_exhaustive()
    }
}

impl EnumParameter {
    /// Create an enumerated parameter over a fixed full range.
    #[must_use]
    pub fn new(name: &str, default_value: i32, full_range: impl Into<VarArray<i32>>) -> Self {
        Self::with_mode(name, default_value, full_range, NotifyMode::Immediate)
    }

    #[must_use]
    pub fn with_mode(
        name: &str,
        default_value: i32,
        full_range: impl Into<VarArray<i32>>,
        mode: NotifyMode,
    ) -> Self {
        Self {
            param: Parameter::with_mode(name, default_value, mode),
            extra: Arc::new(EnumExtra {
                full_range: full_range.into(),
                limiter: Mutex::new(None),
                translator: Mutex::new(None),
            }),
        }
    }

    /// The base parameter (relevance, default, observation).
    #[must_use]
    pub fn parameter(&self) -> &Parameter<i32> {
        &self.param
    }

    /// The underlying value container.
    #[must_use]
    pub fn model(&self) -> &Model<i32> {
        self.param.model()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.param.name()
    }

    #[must_use]
    pub fn id(&self) -> ModelId {
        self.param.id()
    }

    #[must_use]
    pub fn get(&self) -> i32 {
        self.param.get()
    }

    #[must_use]
    pub fn subscribe<F>(&self, callback: F) -> Registration
    where
        F: Fn(&Notice) + Send + Sync + 'static,
    {
        self.param.subscribe(callback)
    }

    /// The immutable full range.
    #[must_use]
    pub fn full_range(&self) -> &VarArray<i32> {
        &self.extra.full_range
    }

    /// Attach a range limiter. Held weakly; the full range applies again
    /// once the caller drops its `Arc`.
    pub fn set_limiter(&self, limiter: &Arc<dyn EnumLimiter>) {
        *lock(&self.extra.limiter) = Some(Arc::downgrade(limiter));
    }

    /// Install the string translator.
    pub fn set_translator(&self, translator: Arc<dyn EnumTranslator>) {
        *lock(&self.extra.translator) = Some(translator);
    }

    /// Recompute the valid range, self-correcting the current value if it
    /// fell out of a non-empty range.
    #[must_use]
    pub fn valid_range(&self) -> VarArray<i32> {
        let mut range = self.extra.full_range.clone();
        let limiter = lock(&self.extra.limiter).as_ref().and_then(Weak::upgrade);
        if let Some(limiter) = limiter {
            limiter.limit_range(self, &mut range);
        }

        if !range.is_empty() && !range.contains(&self.get()) {
            let first = range[0];
            tracing::debug!(
                name = %self.param.name(),
                value = first,
                "current value left the valid range, resetting"
            );
            self.param.model().force_assign(first);
        }
        range
    }

    /// Propose a value; non-members of the freshly recomputed valid range
    /// are silently ignored.
    pub fn assign(&self, value: i32) -> bool {
        if self.valid_range().contains(&value) {
            self.param.assign(value)
        } else {
            false
        }
    }

    /// The next valid value, wrapping circularly. `None` when the current
    /// value is not a member of the valid range.
    #[must_use]
    pub fn next_value(&self) -> Option<i32> {
        let range = self.valid_range();
        let idx = range.index_of(&self.get())?;
        Some(range[(idx + 1) % range.len()])
    }

    /// The previous valid value, wrapping circularly.
    #[must_use]
    pub fn prev_value(&self) -> Option<i32> {
        let range = self.valid_range();
        let idx = range.index_of(&self.get())?;
        Some(range[(idx + range.len() - 1) % range.len()])
    }

    /// Translate-and-assign. Without a translator, falls back to a plain
    /// decimal parse. Untranslatable input is silently abandoned.
    pub fn assign_from_string(&self, text: &str) {
        let translator = lock(&self.extra.translator).clone();
        let value = match translator {
            Some(translator) => translator.to_value(text),
            None => text.trim().parse().ok(),
        };
        if let Some(value) = value {
            self.assign(value);
        }
    }

    /// Render the current value through the translator, or as plain
    /// decimal without one.
    #[must_use]
    pub fn value_to_string(&self) -> String {
        let value = self.get();
        match lock(&self.extra.translator).clone() {
            Some(translator) => translator.to_text(value),
            None => value.to_string(),
        }
    }
}
