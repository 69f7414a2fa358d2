//! First-improvement hill climbing over allocations.
//!
//! Starting from a valid seed, each iteration applies a random reversible
//! move, undoes it if it breaks a capacity constraint, and otherwise keeps
//! it only when the score strictly improves. Regressions and ties are
//! never accepted.
//!
//! # Key Types
//!
//! - [`SearchConfig`]: iteration budget, seed, Add policy, chains
//! - [`LocalSearch`]: one chain as a `Seeded → Searching → Done` state machine
//! - [`LocalSearchRunner`]: drives a chain (or a full rank/seed/search pipeline)
//! - [`SearchResult`]: final allocation with statistics
//! - [`ProgressObserver`]: side channel for `(iteration, score)` updates
//!
//! Independent chains can be run with [`run_chains`]; enable the
//! `parallel` feature to spread them over threads.

mod chains;
mod config;
mod progress;
mod runner;

pub use chains::run_chains;
pub use config::SearchConfig;
pub use progress::{ProgressObserver, ProgressPrinter, Silent};
pub use runner::{solve, LocalSearch, LocalSearchRunner, SearchPhase, SearchResult, StepOutcome};
