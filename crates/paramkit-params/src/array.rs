#![forbid(unsafe_code)]

//! Array-valued parameters with per-element access and CSV round trips.
//!
//! The value is a [`VarArray<T>`] treated as a single unit: bulk decode
//! builds a complete candidate array and proposes it wholesale through
//! the validation pipeline, so partial writes are never visible. Decoding
//! fills as many slots as the array currently has, ignores trailing
//! tokens, and abandons everything on any single parse failure.
//!
//! Per-element assignment is direct access for callers that already hold
//! a validated element value; out-of-range indices fail fast.

use std::fmt::{self, Display};
use std::str::FromStr;

use paramkit_core::{Model, ModelId, Notice, NotifyMode, Registration};
use paramkit_util::{StringTokenizer, VarArray};

use crate::parameter::Parameter;

/// A parameter holding an ordered sequence of `T`.
pub struct ArrayParameter<T> {
    param: Parameter<VarArray<T>>,
}

impl<T> Clone for ArrayParameter<T> {
    fn clone(&self) -> Self {
        Self {
            param: self.param.clone(),
        }
    }
}

impl<T: Clone + PartialEq> fmt::Debug for ArrayParameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayParameter")
            .field("name", &self.param.name())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + PartialEq> ArrayParameter<T> {
    /// Create an array parameter; the default array also fixes the slot
    /// count used by bulk decoding.
    #[must_use]
    pub fn new(name: &str, default_value: impl Into<VarArray<T>>) -> Self {
        Self::with_mode(name, default_value, NotifyMode::Immediate)
    }

    #[must_use]
    pub fn with_mode(
        name: &str,
        default_value: impl Into<VarArray<T>>,
        mode: NotifyMode,
    ) -> Self {
        Self {
            param: Parameter::with_mode(name, default_value.into(), mode),
        }
    }

    /// The base parameter (relevance, default, observation).
    #[must_use]
    pub fn parameter(&self) -> &Parameter<VarArray<T>> {
        &self.param
    }

    /// The underlying value container.
    #[must_use]
    pub fn model(&self) -> &Model<VarArray<T>> {
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

    /// Current number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.param.model().with(VarArray::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn subscribe<F>(&self, callback: F) -> Registration
    where
        F: Fn(&Notice) + Send + Sync + 'static,
    {
        self.param.subscribe(callback)
    }

    /// Current array, cloned out.
    #[must_use]
    pub fn get(&self) -> VarArray<T> {
        self.param.get()
    }

    /// Propose a whole replacement array through the validation pipeline.
    pub fn assign(&self, value: impl Into<VarArray<T>>) -> bool {
        self.param.assign(value.into())
    }

    /// The element at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn element(&self, idx: usize) -> T {
        self.param.model().with(|array| array[idx].clone())
    }

    /// Overwrite one element directly, bypassing rules and voter, and
    /// notify if it actually changed.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn assign_element(&self, value: T, idx: usize) {
        self.param.model().with_mut(|array| array[idx] = value);
        self.param.model().notify_all();
    }

    /// Position of the first element equal to `value`.
    #[must_use]
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.param.model().with(|array| array.index_of(value))
    }

    /// Whether the element at `idx` equals its default counterpart.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range of either array.
    #[must_use]
    pub fn element_is_default(&self, idx: usize) -> bool {
        let default = self.param.default_value();
        self.param.model().with(|array| array[idx] == default[idx])
    }
}

impl<T> ArrayParameter<T>
where
    T: Clone + PartialEq + FromStr + Display,
{
    /// Comma-separated rendering in index order.
    #[must_use]
    pub fn value_to_string(&self) -> String {
        self.param.model().with(|array| {
            let mut out = String::new();
            for (i, element) in array.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&element.to_string());
            }
            out
        })
    }

    /// Decode a comma-separated list into the array's current slots.
    /// Trailing tokens are ignored; missing tokens leave their slots
    /// unchanged; any individual parse failure abandons the whole decode.
    /// The candidate is assigned wholesale through the pipeline.
    pub fn assign_from_string(&self, text: &str) {
        let mut candidate = self.get();
        let mut tokens = StringTokenizer::new(text, ",");
        for idx in 0..candidate.len() {
            let Some(token) = tokens.next_token() else {
                break;
            };
            match token.trim().parse() {
                Ok(value) => candidate[idx] = value,
                Err(_) => return,
            }
        }
        self.assign(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramkit_core::{Voter, rules::ClosureVoter};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn ints(name: &str) -> ArrayParameter<i32> {
        ArrayParameter::new(name, [1, 2, 3])
    }

    #[test]
    fn csv_round_trip() {
        let arr = ints("a");
        arr.assign_from_string("5,6,7");
        assert_eq!(arr.get().as_slice(), &[5, 6, 7]);
        assert_eq!(arr.value_to_string(), "5,6,7");
    }

    #[test]
    fn malformed_token_abandons_whole_decode() {
        let arr = ints("a");
        arr.assign_from_string("5,bad,7");
        assert_eq!(arr.get().as_slice(), &[1, 2, 3], "no partial write");
    }

    #[test]
    fn trailing_tokens_are_ignored() {
        let arr = ints("a");
        arr.assign_from_string("9,8,7,6,5");
        assert_eq!(arr.get().as_slice(), &[9, 8, 7]);
    }

    #[test]
    fn short_input_fills_leading_slots() {
        let arr = ints("a");
        arr.assign_from_string("9");
        assert_eq!(arr.get().as_slice(), &[9, 2, 3]);
    }

    #[test]
    fn decode_goes_through_the_pipeline() {
        let arr = ints("a");
        let veto: Arc<dyn Voter> = Arc::new(ClosureVoter::new(|| false));
        arr.model().set_voter(&veto);

        arr.assign_from_string("5,6,7");
        assert_eq!(arr.get().as_slice(), &[1, 2, 3], "vetoed decode rolls back");
    }

    #[test]
    fn element_access_and_direct_assignment() {
        let arr = ints("a");
        assert_eq!(arr.element(1), 2);

        let hits = Arc::new(AtomicU32::new(0));
        let hits_cl = Arc::clone(&hits);
        let _reg = arr.subscribe(move |_| {
            hits_cl.fetch_add(1, Ordering::SeqCst);
        });

        arr.assign_element(9, 1);
        assert_eq!(arr.element(1), 9);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        arr.assign_element(9, 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1, "unchanged element is silent");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn element_out_of_range_panics() {
        let arr = ints("a");
        let _ = arr.element(3);
    }

    #[test]
    fn element_default_comparison() {
        let arr = ints("a");
        assert!(arr.element_is_default(0));
        arr.assign_element(9, 0);
        assert!(!arr.element_is_default(0));
        assert!(arr.element_is_default(1));
    }

    #[test]
    fn index_of_finds_elements() {
        let arr = ints("a");
        assert_eq!(arr.index_of(&3), Some(2));
        assert_eq!(arr.index_of(&42), None);
    }

    #[test]
    fn wholesale_assignment_notifies_once() {
        let arr = ints("a");
        let hits = Arc::new(AtomicU32::new(0));
        let hits_cl = Arc::clone(&hits);
        let _reg = arr.subscribe(move |_| {
            hits_cl.fetch_add(1, Ordering::SeqCst);
        });

        assert!(arr.assign([7, 8, 9]));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
