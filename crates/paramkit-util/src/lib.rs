#![forbid(unsafe_code)]

//! Utility collaborators for the paramkit model engine.
//!
//! These types are deliberately simple and carry no model semantics of
//! their own:
//!
//! - [`VarArray`]: a growable sequence bounded to `u16::MAX` elements,
//!   used as the value representation of array-valued containers.
//! - [`StringTokenizer`]: a delimiter-driven tokenizer consumed by the
//!   comma-separated array decode path.

pub mod tokenizer;
pub mod var_array;

pub use tokenizer::{StringTokenizer, split};
pub use var_array::VarArray;
