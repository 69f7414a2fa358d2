//! Allocations of videos to caches.
//!
//! - [`Allocation`]: the mutable cache → video-set mapping, with cached
//!   per-cache usage and capacity checks.
//! - [`InitialAllocator`]: greedy, deterministic seed built from an
//!   [`ImportanceTable`](crate::ranking::ImportanceTable).
//! - [`write_allocation`] / [`format_allocation`]: text output.

mod initial;
mod output;
mod types;

pub use initial::InitialAllocator;
pub use output::{format_allocation, write_allocation};
pub use types::Allocation;
