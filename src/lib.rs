//! Edge-cache content allocation.
//!
//! Assigns videos to capacity-constrained caches so as to maximize the
//! request-weighted latency saved for a population of endpoints:
//!
//! - **Model**: immutable [`Instance`](model::Instance) of videos,
//!   endpoints, caches and request volumes, with a text reader.
//! - **Ranking**: per-cache ordering of videos by estimated latency saved
//!   per unit of space.
//! - **Allocation**: the cache → video-set mapping, greedy seeding from the
//!   ranking, and text output.
//! - **Score**: request-weighted latency reduction of an allocation.
//! - **Mutation**: random Swap / Add moves that can be undone exactly.
//! - **Search**: first-improvement hill climbing under a fixed iteration
//!   budget, optionally as several independent chains.
//!
//! # Example
//!
//! ```
//! use u_cachealloc::model::Instance;
//! use u_cachealloc::search::{solve, SearchConfig};
//!
//! let text = "2 2 2 1 3\n2 1\n100 1\n0 20\n150 1\n0 80\n0 0 1000\n1 1 500\n";
//! let instance: Instance = text.parse().unwrap();
//! let result = solve(&instance, &SearchConfig::default().with_max_iterations(100).with_seed(1)).unwrap();
//! assert_eq!(result.score, 76_667);
//! ```

pub mod allocation;
pub mod error;
pub mod model;
pub mod mutation;
pub mod ranking;
pub mod score;
pub mod search;
