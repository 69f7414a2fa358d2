//! Problem instance model.
//!
//! An [`Instance`] describes the video catalogue, the endpoints with their
//! latencies to the origin and to each reachable cache, the caches with
//! their capacities, and the request volume per (video, endpoint) pair.
//! It is built once (from text via [`Instance::parse`] or in code via
//! [`Instance::new`]) and never mutated afterwards.

mod parse;
mod types;

pub use parse::MAX_CACHES;

pub use types::{
    Cache, CacheId, CacheLink, Endpoint, EndpointId, Instance, Request, RequestProfile, Video,
    VideoId,
};
