#![forbid(unsafe_code)]

//! Propagation rules and voters.
//!
//! An [`AssignRule`] pushes a derived change into a dependent container
//! whenever its source container is assigned; a [`Voter`] is a single
//! consistency check consulted before a top-level mutation commits.
//!
//! # Contract
//!
//! - `apply` runs on every mutation attempt, in registration order, after
//!   the source container's live value has been set to the candidate. A
//!   rule typically reads the source value and assigns into its dependent
//!   container with [`Origin::RulePropagation`](crate::Origin), which
//!   skips voter/rule validation on that container.
//! - `validate` runs only for top-level (user-originated) attempts; all
//!   rules must accept, in addition to the voter.
//! - On rejection, `revert` is called on every rule in forward
//!   registration order. Rules must therefore be independently idempotent:
//!   each reverts its own side effects without depending on the revert
//!   order of its siblings.
//!
//! Rules are caller-owned; containers keep only weak references and prune
//! dead entries lazily.

use crate::model::Model;

/// A propagation rule attached to a container of `T`.
pub trait AssignRule<T>: Send + Sync {
    /// Propagate the source container's freshly assigned value.
    fn apply(&self, source: &Model<T>);

    /// Undo this rule's side effects after a rejected mutation.
    fn revert(&self);

    /// Accept or reject the overall assignment. Default: accept.
    fn validate(&self) -> bool {
        true
    }
}

/// A single consistency check consulted before a top-level commit.
pub trait Voter: Send + Sync {
    fn vote(&self) -> bool;
}

/// Voter backed by a closure, for simple predicates.
pub struct ClosureVoter<F: Fn() -> bool + Send + Sync> {
    predicate: F,
}

impl<F: Fn() -> bool + Send + Sync> ClosureVoter<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F: Fn() -> bool + Send + Sync> Voter for ClosureVoter<F> {
    fn vote(&self) -> bool {
        (self.predicate)()
    }
}
