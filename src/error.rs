//! Error types.
//!
//! Each failure family has its own enum so callers can match on exactly
//! what can go wrong at a given stage:
//!
//! - [`ParseError`]: the input text is malformed.
//! - [`ModelError`]: an [`Instance`](crate::model::Instance) built in code
//!   has inconsistent references.
//! - [`AllocationError`]: an allocation breaks the capacity invariant.
//! - [`ScoreError`]: the score is undefined for the instance.
//! - [`ConfigError`]: search parameters are out of range.
//! - [`SearchError`]: anything that aborts a search run.
//!
//! Rejected mutations are not errors; the search loop rolls them back.

use crate::model::{CacheId, EndpointId, VideoId};

/// Malformed input text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The input ended before all declared sections were read.
    #[error("line {line}: unexpected end of input, expected {expected}")]
    UnexpectedEof { line: usize, expected: &'static str },

    /// A token could not be read as a non-negative integer.
    #[error("line {line}: invalid number {token:?}")]
    InvalidNumber { line: usize, token: String },

    /// A line has the wrong number of fields.
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// An identifier refers past the declared count.
    #[error("line {line}: {kind} id {id} out of range (count {count})")]
    IdOutOfRange {
        line: usize,
        kind: &'static str,
        id: usize,
        count: usize,
    },

    /// The header declares more caches than the reader accepts.
    #[error("line {line}: {count} caches declared, at most {limit} supported")]
    TooManyCaches {
        line: usize,
        count: usize,
        limit: usize,
    },

    /// Non-empty content after the last declared request line.
    #[error("line {line}: trailing content after {declared} request descriptions")]
    TrailingContent { line: usize, declared: usize },

    /// The parsed sections do not form a valid instance.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Inconsistent instance data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("video {0} has zero size")]
    ZeroVideoSize(VideoId),

    #[error("cache {0} has zero capacity")]
    ZeroCapacity(CacheId),

    #[error("endpoint {endpoint} links to unknown cache {cache}")]
    UnknownCache { endpoint: EndpointId, cache: CacheId },

    #[error("endpoint {endpoint} links to cache {cache} more than once")]
    DuplicateLink { endpoint: EndpointId, cache: CacheId },

    #[error("request references unknown video {0}")]
    UnknownVideo(VideoId),

    #[error("request references unknown endpoint {0}")]
    UnknownEndpoint(EndpointId),

    #[error("total request count does not fit in 64 bits")]
    RequestTotalOverflow,
}

/// Capacity invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("cache {cache} holds {used} units but has capacity {capacity}")]
    CapacityExceeded {
        cache: CacheId,
        used: u64,
        capacity: u64,
    },

    #[error("allocation has {found} caches, instance has {expected}")]
    CacheCountMismatch { expected: usize, found: usize },

    #[error("cache {cache} holds video {video}, which the instance does not have")]
    UnknownVideo { cache: CacheId, video: VideoId },

    /// Tracked usage disagrees with the instance's video sizes, e.g. the
    /// allocation was filled against a different instance.
    #[error("cache {cache} records {recorded} units used but its videos take {actual}")]
    UsageMismatch {
        cache: CacheId,
        recorded: u64,
        actual: u64,
    },
}

/// The score of an allocation cannot be computed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    /// Total request volume is zero, so the weighted average is undefined.
    #[error("instance has no requests; score is undefined")]
    NoRequests,
}

/// Invalid search parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("history_interval must be positive")]
    ZeroHistoryInterval,

    #[error("chains must be at least 1")]
    ZeroChains,
}

/// Fatal failure of a search run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("invalid search config: {0}")]
    Config(#[from] ConfigError),

    #[error("scoring failed: {0}")]
    Score(#[from] ScoreError),

    #[error("seed allocation is invalid: {0}")]
    InvalidSeed(#[from] AllocationError),
}
