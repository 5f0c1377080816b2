#![forbid(unsafe_code)]

//! Reactive typed-value containers for configuration and parameter
//! systems.
//!
//! A [`Model<T>`] holds a named value; observers subscribe to it and are
//! notified on every committed change, immediately or batched through a
//! [`Dispatcher`]. Proposed mutations run a validation pipeline of
//! propagation rules and an optional voter, rolling back exactly on
//! rejection. The parameter layer adds defaults, relevance flags, and
//! the constrained kinds: bounded numerics, range-limited enumerations,
//! and CSV-codable arrays.
//!
//! ```
//! use paramkit::{NumParameter, Parameter};
//!
//! let volume = NumParameter::new("volume", 50, 0, 100, 5);
//! let muted = Parameter::new("muted", false);
//!
//! let _watch = volume.subscribe(|notice| {
//!     println!("{} changed", notice.name);
//! });
//!
//! volume.assign(250);
//! assert_eq!(volume.get(), 100); // clamped at the bound
//! assert_eq!(volume.next_value_rotated(), 0);
//! # let _ = muted;
//! ```

pub use paramkit_core::{
    AssignRule, Dispatcher, DispatcherConfig, Model, ModelId, Notice, NotifyMode, Observer,
    Origin, Payload, Registration, Voter,
    rules::ClosureVoter,
};
pub use paramkit_params::{
    ArrayParameter, EnumLimiter, EnumParameter, EnumTranslator, Event, NumLimits, NumParameter,
    Numeric, Parameter, TypedEvent,
};
pub use paramkit_util::{StringTokenizer, VarArray, split};
