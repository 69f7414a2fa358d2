//! Reversible random moves on an allocation.
//!
//! [`MutationEngine`] applies a Swap or an Add in place and hands back a
//! [`Mutation`] command that restores the exact prior state when undone.
//! Validation is left to the caller.

mod engine;
mod types;

pub use engine::MutationEngine;
pub use types::{AddPolicy, MoveKind, Mutation};
