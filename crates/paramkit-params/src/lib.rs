#![forbid(unsafe_code)]

//! Constrained parameter specializations built on [`paramkit_core`].
//!
//! A [`Parameter<T>`] wraps a [`Model<T>`](paramkit_core::Model) and adds
//! a fixed default value plus an independently observable relevance flag.
//! On top of it sit the constrained kinds:
//!
//! - [`NumParameter<T>`] — numeric values with min/max/step bounds, an
//!   optional dynamic limits provider, stepped navigation, and decimal
//!   string round trips.
//! - [`EnumParameter`] — discrete values restricted to a dynamically
//!   narrowable valid range, with optional string translation.
//! - [`ArrayParameter<T>`] — sequence values with per-element access and
//!   comma-separated bulk encode/decode.
//! - [`Event`] / [`TypedEvent<T>`] — value-less occurrence signals that
//!   reuse the container notification machinery.
//!
//! Malformed string input is silently abandoned throughout (no state
//! change, no signal); index and capacity violations fail fast.

pub mod array;
pub mod enumerated;
pub mod event;
pub mod numeric;
pub mod parameter;

pub use array::ArrayParameter;
pub use enumerated::{EnumLimiter, EnumParameter, EnumTranslator};
pub use event::{Event, TypedEvent};
pub use numeric::{NumLimits, NumParameter, Numeric};
pub use parameter::Parameter;

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering the guard if a panicking holder poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
