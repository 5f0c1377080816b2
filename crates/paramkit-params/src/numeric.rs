#![forbid(unsafe_code)]

//! Numeric parameters with bounds, stepping, and string round trips.
//!
//! One generic [`NumParameter<T>`] covers every numeric kind through the
//! [`Numeric`] capability: locale-free parse/format via `FromStr` and
//! `Display`, saturating step arithmetic, and per-type extreme bounds.
//!
//! Candidates are clamped into `[min, max]` *before* entering the
//! validation pipeline; the clamp itself always succeeds, it merely
//! saturates. Bounds resolve dynamically when a [`NumLimits`] provider is
//! attached.

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::{Arc, Mutex, Weak};

use paramkit_core::{Model, ModelId, Notice, NotifyMode, Registration};

use crate::lock;
use crate::parameter::Parameter;

/// Numeric capability: frame bounds, a unit step, saturating arithmetic,
/// and locale-free text conversion.
pub trait Numeric:
    Copy + PartialOrd + PartialEq + FromStr + Display + Send + Sync + 'static
{
    /// Smallest representable value of the type.
    const MIN_BOUND: Self;
    /// Largest representable value of the type.
    const MAX_BOUND: Self;
    /// The unit step.
    const ONE: Self;

    /// Addition saturating at [`MAX_BOUND`](Self::MAX_BOUND).
    fn add(self, rhs: Self) -> Self;
    /// Subtraction saturating at [`MIN_BOUND`](Self::MIN_BOUND).
    fn sub(self, rhs: Self) -> Self;
}

macro_rules! numeric_int {
    ($($ty:ty)*) => {$(
        impl Numeric for $ty {
            const MIN_BOUND: Self = <$ty>::MIN;
            const MAX_BOUND: Self = <$ty>::MAX;
            const ONE: Self = 1;

            fn add(self, rhs: Self) -> Self {
                self.saturating_add(rhs)
            }

            fn sub(self, rhs: Self) -> Self {
                self.saturating_sub(rhs)
            }
        }
    )*};
}

macro_rules! numeric_float {
    ($($ty:ty)*) => {$(
        impl Numeric for $ty {
            const MIN_BOUND: Self = <$ty>::MIN;
            const MAX_BOUND: Self = <$ty>::MAX;
            const ONE: Self = 1.0;

            fn add(self, rhs: Self) -> Self {
                self + rhs
            }

            fn sub(self, rhs: Self) -> Self {
                self - rhs
            }
        }
    )*};
}

numeric_int!(i16 i32 i64 u16 u32 u64);
numeric_float!(f32 f64);

/// Dynamic bounds provider consulted on every bound query, overriding the
/// static `[min, max]` while attached.
pub trait NumLimits<T: Numeric>: Send + Sync {
    fn min_value(&self, source: &NumParameter<T>) -> T;
    fn max_value(&self, source: &NumParameter<T>) -> T;
}

struct NumExtra<T: Numeric> {
    min: T,
    max: T,
    step: T,
    limits: Mutex<Option<Weak<dyn NumLimits<T>>>>,
}

/// A numeric parameter with clamped assignment and stepped navigation.
pub struct NumParameter<T: Numeric> {
    param: Parameter<T>,
    extra: Arc<NumExtra<T>>,
}

impl<T: Numeric> Clone for NumParameter<T> {
    fn clone(&self) -> Self {
        Self {
            param: self.param.clone(),
            extra: Arc::clone(&self.extra),
        }
    }
}

impl<T: Numeric + fmt::Debug> fmt::Debug for NumParameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumParameter")
            .field("name", &self.param.name())
            .field("min", &self.extra.min)
            .field("max", &self.extra.max)
            .field("step", &self.extra.step)
            .finish_non_exhaustive()
    }
}

impl<T: Numeric> NumParameter<T> {
    /// Create a numeric parameter with static bounds and a step. The
    /// default is clamped into the bounds.
    #[must_use]
    pub fn new(name: &str, default_value: T, min: T, max: T, step: T) -> Self {
        Self::with_mode(name, default_value, min, max, step, NotifyMode::Immediate)
    }

    /// Create a parameter spanning the whole type range with unit step.
    #[must_use]
    pub fn unbounded(name: &str, default_value: T) -> Self {
        Self::new(name, default_value, T::MIN_BOUND, T::MAX_BOUND, T::ONE)
    }

    #[must_use]
    pub fn with_mode(
        name: &str,
        default_value: T,
        min: T,
        max: T,
        step: T,
        mode: NotifyMode,
    ) -> Self {
        let default_value = clamp(default_value, min, max);
        Self {
            param: Parameter::with_mode(name, default_value, mode),
            extra: Arc::new(NumExtra {
                min,
                max,
                step,
                limits: Mutex::new(None),
            }),
        }
    }

    /// The base parameter (relevance, default, observation).
    #[must_use]
    pub fn parameter(&self) -> &Parameter<T> {
        &self.param
    }

    /// The underlying value container.
    #[must_use]
    pub fn model(&self) -> &Model<T> {
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
    pub fn get(&self) -> T {
        self.param.get()
    }

    #[must_use]
    pub fn subscribe<F>(&self, callback: F) -> Registration
    where
        F: Fn(&Notice) + Send + Sync + 'static,
    {
        self.param.subscribe(callback)
    }

    /// Attach a dynamic limits provider. Held weakly; the static bounds
    /// return once the caller drops its `Arc`.
    pub fn set_limits(&self, limits: &Arc<dyn NumLimits<T>>) {
        *lock(&self.extra.limits) = Some(Arc::downgrade(limits));
    }

    /// Detach the limits provider, restoring the static bounds.
    pub fn clear_limits(&self) {
        *lock(&self.extra.limits) = None;
    }

    fn live_limits(&self) -> Option<Arc<dyn NumLimits<T>>> {
        lock(&self.extra.limits).as_ref().and_then(Weak::upgrade)
    }

    /// Effective lower bound: the limits provider if attached, else the
    /// static minimum.
    #[must_use]
    pub fn min(&self) -> T {
        match self.live_limits() {
            Some(limits) => limits.min_value(self),
            None => self.extra.min,
        }
    }

    /// Effective upper bound.
    #[must_use]
    pub fn max(&self) -> T {
        match self.live_limits() {
            Some(limits) => limits.max_value(self),
            None => self.extra.max,
        }
    }

    #[must_use]
    pub fn step(&self) -> T {
        self.extra.step
    }

    /// Clamp the candidate into `[min, max]`, then propose it through the
    /// validation pipeline. The clamp always succeeds; the return value
    /// reflects only the pipeline verdict.
    pub fn assign(&self, value: T) -> bool {
        let clamped = clamp(value, self.min(), self.max());
        self.param.assign(clamped)
    }

    /// Set the value back to the default through the clamped pipeline, so
    /// narrowed dynamic limits still apply.
    pub fn reset_to_default(&self) -> bool {
        self.assign(self.param.default_value())
    }

    /// The value one step up, saturating at the upper bound.
    #[must_use]
    pub fn next_value(&self) -> T {
        let value = self.get();
        let max = self.max();
        if max.sub(self.step()) < value {
            max
        } else {
            value.add(self.step())
        }
    }

    /// The value one step down, saturating at the lower bound.
    #[must_use]
    pub fn prev_value(&self) -> T {
        let value = self.get();
        let min = self.min();
        if min.add(self.step()) > value {
            min
        } else {
            value.sub(self.step())
        }
    }

    /// The value one step up, wrapping to the lower bound past the top.
    #[must_use]
    pub fn next_value_rotated(&self) -> T {
        let value = self.get();
        let max = self.max();
        if max.sub(self.step()) < value {
            self.min()
        } else {
            value.add(self.step())
        }
    }

    /// The value one step down, wrapping to the upper bound past the
    /// bottom.
    #[must_use]
    pub fn prev_value_rotated(&self) -> T {
        let value = self.get();
        let min = self.min();
        if min.add(self.step()) > value {
            self.max()
        } else {
            value.sub(self.step())
        }
    }

    /// Best-effort parse-and-assign. Malformed input is silently
    /// abandoned: no state change, no signal.
    pub fn assign_from_string(&self, text: &str) {
        if let Ok(value) = text.trim().parse::<T>() {
            self.assign(value);
        }
    }

    /// Locale-free decimal rendering of the current value.
    #[must_use]
    pub fn value_to_string(&self) -> String {
        self.get().to_string()
    }
}

fn clamp<T: Numeric>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramkit_core::{Voter, rules::ClosureVoter};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn assignment_clamps_to_bounds() {
        let num = NumParameter::new("n", 5, 0, 10, 1);
        assert!(num.assign(42));
        assert_eq!(num.get(), 10);
        assert!(num.assign(-3));
        assert_eq!(num.get(), 0);
        assert!(num.assign(7));
        assert_eq!(num.get(), 7);
    }

    #[test]
    fn clamp_to_current_value_is_silent() {
        let num = NumParameter::new("n", 10, 0, 10, 1);
        let hits = Arc::new(AtomicU32::new(0));
        let hits_cl = Arc::clone(&hits);
        let _reg = num.subscribe(move |_| {
            hits_cl.fetch_add(1, Ordering::SeqCst);
        });

        assert!(num.assign(99), "clamped assignment succeeds");
        assert_eq!(num.get(), 10);
        assert_eq!(hits.load(Ordering::SeqCst), 0, "stored value never moved");
    }

    #[test]
    fn stepping_saturates_at_bounds() {
        // Bounds [0,10], step 1, value 10: next stays, rotated wraps.
        let num = NumParameter::new("n", 10, 0, 10, 1);
        assert_eq!(num.next_value(), 10);
        assert_eq!(num.next_value_rotated(), 0);

        assert!(num.assign(0));
        assert_eq!(num.prev_value(), 0);
        assert_eq!(num.prev_value_rotated(), 10);
    }

    #[test]
    fn stepping_moves_inside_bounds() {
        let num = NumParameter::new("n", 5, 0, 10, 2);
        assert_eq!(num.next_value(), 7);
        assert_eq!(num.prev_value(), 3);
        assert_eq!(num.next_value_rotated(), 7);
        assert_eq!(num.prev_value_rotated(), 3);
    }

    #[test]
    fn stepping_clips_partial_step_at_bound() {
        let num = NumParameter::new("n", 9, 0, 10, 2);
        assert_eq!(num.next_value(), 10, "partial step clips to the bound");
        assert_eq!(num.next_value_rotated(), 0, "partial step wraps instead");
    }

    #[test]
    fn unsigned_prev_rotated_wraps_at_zero() {
        let num = NumParameter::new("n", 0u16, 0, 10, 1);
        assert_eq!(num.prev_value(), 0);
        assert_eq!(num.prev_value_rotated(), 10);
    }

    struct Narrow;

    impl NumLimits<i32> for Narrow {
        fn min_value(&self, _source: &NumParameter<i32>) -> i32 {
            2
        }

        fn max_value(&self, _source: &NumParameter<i32>) -> i32 {
            4
        }
    }

    #[test]
    fn limits_provider_overrides_static_bounds() {
        let num = NumParameter::new("n", 5, 0, 10, 1);
        let limits: Arc<dyn NumLimits<i32>> = Arc::new(Narrow);
        num.set_limits(&limits);

        assert_eq!(num.min(), 2);
        assert_eq!(num.max(), 4);
        assert!(num.assign(9));
        assert_eq!(num.get(), 4);

        drop(limits);
        assert_eq!(num.max(), 10, "static bounds return when provider dies");
    }

    #[test]
    fn clear_limits_restores_static_bounds() {
        let num = NumParameter::new("n", 5, 0, 10, 1);
        let limits: Arc<dyn NumLimits<i32>> = Arc::new(Narrow);
        num.set_limits(&limits);
        assert_eq!(num.max(), 4);

        num.clear_limits();
        assert_eq!(num.max(), 10);
    }

    #[test]
    fn malformed_string_is_silently_abandoned() {
        let num = NumParameter::new("n", 5, 0, 10, 1);
        num.assign_from_string("not a number");
        assert_eq!(num.get(), 5);
        num.assign_from_string("");
        assert_eq!(num.get(), 5);
    }

    #[test]
    fn string_round_trip() {
        let num = NumParameter::new("n", 5, 0, 100, 1);
        num.assign_from_string(" 42 ");
        assert_eq!(num.get(), 42);
        assert_eq!(num.value_to_string(), "42");
    }

    #[test]
    fn default_is_clamped_at_construction() {
        let num = NumParameter::new("n", 99, 0, 10, 1);
        assert_eq!(num.get(), 10);
    }

    #[test]
    fn voter_vetoes_but_clamp_still_happened_first() {
        let num = NumParameter::new("n", 5, 0, 10, 1);
        let veto: Arc<dyn Voter> = Arc::new(ClosureVoter::new(|| false));
        num.model().set_voter(&veto);

        assert!(!num.assign(42));
        assert_eq!(num.get(), 5, "vetoed attempt leaves the value alone");
    }

    #[test]
    fn float_parameter_works() {
        let num = NumParameter::new("f", 0.5f64, 0.0, 1.0, 0.25);
        assert_eq!(num.next_value(), 0.75);
        assert!(num.assign(2.0));
        assert_eq!(num.get(), 1.0);
    }

    #[test]
    fn reset_to_default_respects_narrowed_limits() {
        let num = NumParameter::new("n", 8, 0, 10, 1);
        let limits: Arc<dyn NumLimits<i32>> = Arc::new(Narrow);
        num.set_limits(&limits);

        num.assign(3);
        assert!(num.reset_to_default());
        assert_eq!(num.get(), 4, "default 8 clamps into the narrowed range");
    }
}
