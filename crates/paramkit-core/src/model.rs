#![forbid(unsafe_code)]

//! The value container and its validation pipeline.
//!
//! A [`Model<T>`] pairs a value of `T` with a change flag, a rollback
//! snapshot, an observer list, and the propagation/validation hooks. It is
//! a cheap handle: clones share the same underlying container.
//!
//! # Pipeline order
//!
//! A mutation attempt ([`Model::assign`]) proceeds in fixed order:
//!
//! 1. Gate: if an attempt is already in flight on this container, the new
//!    attempt is silently ignored (reported as accepted).
//! 2. Snapshot: the current value becomes the rollback snapshot, then the
//!    candidate becomes the live value.
//! 3. Rules: every attached [`AssignRule`] runs in registration order and
//!    may propagate into dependent containers.
//! 4. Verdict (top-level attempts only): the voter, then every rule's
//!    `validate`, must all accept. [`Origin::RulePropagation`] attempts
//!    skip this step so a rule-driven write cannot be vetoed downstream.
//! 5. Commit or rollback: on acceptance the change flag is set exactly
//!    when the stored value differs from the snapshot, and observers are
//!    notified; on rejection the snapshot is restored, every rule's
//!    `revert` runs in registration order, and no notice is sent.
//!
//! Locks are never held across rule application or observer delivery, so
//! observers and rules may freely read and mutate other containers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::dispatch::Dispatcher;
use crate::lock;
use crate::observer::{ClosureObserver, Notice, Observer, Payload, Registration};
use crate::rules::{AssignRule, Voter};

pub(crate) mod core;

use self::core::ModelCore;

/// Stable process-unique identity of a container.
///
/// Identifies the source of a [`Notice`] without borrowing into container
/// internals, and survives for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl ModelId {
    /// Allocate the next unused id.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a container delivers committed-change notices.
#[derive(Debug, Clone, Default)]
pub enum NotifyMode {
    /// Deliver synchronously on the mutating thread.
    #[default]
    Immediate,
    /// Hand off to a dispatcher; delivery happens on its worker thread.
    Deferred(Dispatcher),
}

/// Who initiated a mutation attempt.
///
/// Top-level edits face the full verdict step; rule-driven propagation
/// does not, so a committed top-level edit can fan out without being
/// vetoed halfway through the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A top-level edit: voter and rule validation apply.
    UserEdit,
    /// A write performed by a propagation rule: validation is skipped.
    RulePropagation,
}

struct ValueState<T> {
    value: T,
    /// Rollback snapshot from immediately before the in-flight attempt.
    prior: T,
    changed: bool,
    in_flight: bool,
}

struct Hooks<T> {
    rules: Vec<Weak<dyn AssignRule<T>>>,
    voter: Option<Weak<dyn Voter>>,
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            voter: None,
        }
    }
}

/// A named, shared, change-tracked value container.
///
/// Cloning the handle shares the container; `T` itself needs only
/// [`Clone`] and [`PartialEq`] for the pipeline to snapshot and compare.
pub struct Model<T> {
    core: Arc<ModelCore>,
    state: Arc<Mutex<ValueState<T>>>,
    hooks: Arc<Mutex<Hooks<T>>>,
}

impl<T> Clone for Model<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            state: Arc::clone(&self.state),
            hooks: Arc::clone(&self.hooks),
        }
    }
}

impl<T> fmt::Debug for Model<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.core.id())
            .field("name", &self.core.name())
            .finish_non_exhaustive()
    }
}

impl<T> Model<T> {
    /// Stable identity of this container.
    #[must_use]
    pub fn id(&self) -> ModelId {
        self.core.id()
    }

    /// Name of this container, as given at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Replace the notification delivery mode.
    pub fn set_notify_mode(&self, mode: NotifyMode) {
        self.core.set_mode(mode);
    }

    /// Whether a committed change is awaiting notification handoff.
    #[must_use]
    pub fn changed(&self) -> bool {
        lock(&self.state).changed
    }

    /// Set the change flag without mutating the value. The next
    /// [`notify_all`](Self::notify_all) will fire even though the value is
    /// untouched; event-style containers use this to signal occurrences.
    pub fn mark_changed(&self) {
        lock(&self.state).changed = true;
    }

    /// Attach a propagation rule. The container keeps only a weak
    /// reference; the rule stops running when the caller drops its `Arc`.
    pub fn add_rule(&self, rule: &Arc<dyn AssignRule<T>>) {
        lock(&self.hooks).rules.push(Arc::downgrade(rule));
    }

    /// Attach a propagation rule and run its `apply` once immediately, so
    /// the dependent container synchronizes with the current value.
    pub fn add_rule_applying(&self, rule: &Arc<dyn AssignRule<T>>) {
        self.add_rule(rule);
        rule.apply(self);
    }

    /// Install the voter, replacing any previous one. Held weakly; a
    /// dropped voter counts as accepting.
    pub fn set_voter(&self, voter: &Arc<dyn Voter>) {
        lock(&self.hooks).voter = Some(Arc::downgrade(voter));
    }

    /// The currently installed voter, if alive.
    #[must_use]
    pub fn voter(&self) -> Option<Arc<dyn Voter>> {
        lock(&self.hooks).voter.as_ref().and_then(Weak::upgrade)
    }

    /// Register an observer. The returned guard unregisters on drop.
    #[must_use]
    pub fn register_observer(&self, observer: Arc<dyn Observer>) -> Registration {
        self.core.register(&observer);
        Registration::new(observer, Arc::downgrade(&self.core))
    }

    /// Register an observer and immediately deliver it one payload-free
    /// notice (outside any lock), so it can synchronize with the current
    /// state at link time.
    #[must_use]
    pub fn register_observer_with_initial(&self, observer: Arc<dyn Observer>) -> Registration {
        let registration = self.register_observer(Arc::clone(&observer));
        self.core.deliver_to(&observer);
        registration
    }

    /// Unregister an observer previously passed to
    /// [`register_observer`](Self::register_observer).
    pub fn unregister_observer(&self, observer: &Arc<dyn Observer>) {
        self.core.unregister(observer);
    }

    /// Register a closure observer.
    #[must_use]
    pub fn subscribe<F>(&self, callback: F) -> Registration
    where
        F: Fn(&Notice) + Send + Sync + 'static,
    {
        self.register_observer(Arc::new(ClosureObserver::new(callback)))
    }

    /// Register a closure observer and deliver it one initial notice.
    #[must_use]
    pub fn subscribe_with_initial<F>(&self, callback: F) -> Registration
    where
        F: Fn(&Notice) + Send + Sync + 'static,
    {
        self.register_observer_with_initial(Arc::new(ClosureObserver::new(callback)))
    }

    /// Borrow the value for the duration of `f`. No container lock is held
    /// when `f` returns, but `f` itself must not touch this container.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&lock(&self.state).value)
    }

    fn rules_snapshot(&self) -> Vec<Arc<dyn AssignRule<T>>> {
        let mut hooks = lock(&self.hooks);
        hooks.rules.retain(|rule| rule.strong_count() > 0);
        hooks.rules.iter().filter_map(Weak::upgrade).collect()
    }

    fn vote(&self) -> bool {
        match lock(&self.hooks).voter.as_ref().and_then(Weak::upgrade) {
            Some(voter) => voter.vote(),
            None => true,
        }
    }
}

impl<T: Clone + PartialEq> Model<T> {
    /// Create a container with immediate (synchronous) notification.
    #[must_use]
    pub fn new(name: &str, initial: T) -> Self {
        Self::with_mode(name, initial, NotifyMode::Immediate)
    }

    /// Create a container with the given notification mode.
    #[must_use]
    pub fn with_mode(name: &str, initial: T, mode: NotifyMode) -> Self {
        let prior = initial.clone();
        Self {
            core: Arc::new(ModelCore::new(name, mode)),
            state: Arc::new(Mutex::new(ValueState {
                value: initial,
                prior,
                changed: false,
                in_flight: false,
            })),
            hooks: Arc::new(Mutex::new(Hooks::default())),
        }
    }

    /// Current value, cloned out of the container.
    #[must_use]
    pub fn get(&self) -> T {
        lock(&self.state).value.clone()
    }

    /// Propose a top-level assignment. Returns whether the attempt was
    /// accepted; a veto restores the pre-attempt value exactly.
    pub fn assign(&self, value: T) -> bool {
        self.assign_with_origin(value, Origin::UserEdit)
    }

    /// Propose an assignment with an explicit origin. Rule-originated
    /// attempts skip the verdict step.
    pub fn assign_with_origin(&self, value: T, origin: Origin) -> bool {
        {
            let mut state = lock(&self.state);
            if state.in_flight {
                // Re-entrant attempt from a rule or observer on the same
                // container: ignore, report accepted.
                return true;
            }
            state.in_flight = true;
            state.prior = state.value.clone();
            state.value = value;
        }

        let rules = self.rules_snapshot();
        for rule in &rules {
            rule.apply(self);
        }

        if origin == Origin::UserEdit && !self.verdict(&rules) {
            tracing::debug!(model = %self.core.name(), "assignment vetoed, rolling back");
            self.rollback(&rules);
            lock(&self.state).in_flight = false;
            return false;
        }

        {
            let mut state = lock(&self.state);
            state.changed = state.value != state.prior;
        }
        // Notify before clearing the gate so observer writes back into
        // this container are ignored rather than recursing.
        self.notify_all();
        lock(&self.state).in_flight = false;
        true
    }

    /// Store a value directly, bypassing rules and voter. Observers are
    /// still notified if the stored value actually changed.
    pub fn force_assign(&self, value: T) {
        {
            let mut state = lock(&self.state);
            state.prior = state.value.clone();
            state.value = value;
            state.changed = state.value != state.prior;
        }
        self.notify_all();
    }

    /// Mutate the value in place, bypassing rules and voter. The change
    /// flag is set exactly when `f` left the value different; call
    /// [`notify_all`](Self::notify_all) afterwards to publish it.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut state = lock(&self.state);
        let before = state.value.clone();
        let result = f(&mut state.value);
        if state.value != before {
            state.prior = before;
            state.changed = true;
        }
        result
    }

    /// Run the verdict step by hand: voter, then every rule's `validate`.
    #[must_use]
    pub fn validate_assignment(&self) -> bool {
        let rules = self.rules_snapshot();
        self.verdict(&rules)
    }

    /// Restore the rollback snapshot and run every rule's `revert` in
    /// registration order. No notice is sent.
    pub fn revert_assignment(&self) {
        let rules = self.rules_snapshot();
        self.rollback(&rules);
    }

    /// Deliver a notice to observers if the change flag is set, then clear
    /// the flag. In deferred mode the flag is cleared at handoff; delivery
    /// happens later on the dispatcher's worker.
    pub fn notify_all(&self) {
        self.publish(None);
    }

    /// Like [`notify_all`](Self::notify_all), attaching a payload.
    pub fn notify_with_payload(&self, payload: Payload) {
        self.publish(Some(payload));
    }

    fn publish(&self, payload: Option<Payload>) {
        {
            let mut state = lock(&self.state);
            if !state.changed {
                return;
            }
            state.changed = false;
        }
        self.core.notify(payload);
    }

    fn verdict(&self, rules: &[Arc<dyn AssignRule<T>>]) -> bool {
        self.vote() && rules.iter().all(|rule| rule.validate())
    }

    fn rollback(&self, rules: &[Arc<dyn AssignRule<T>>]) {
        {
            let mut state = lock(&self.state);
            state.value = state.prior.clone();
            state.changed = false;
        }
        for rule in rules {
            rule.revert();
        }
    }
}
