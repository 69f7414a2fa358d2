//! Importance ranking of videos per cache.
//!
//! For a cache `c` and a video `v`, the importance is the estimated latency
//! saved per unit of cache space if `v` were stored on `c`:
//!
//! ```text
//! importance(c, v) = Σ_e ceil((L_D(e) - L_c(e)) * requests(v, e) / size(v))
//! ```
//!
//! summed over endpoints `e` that request `v` and can reach `c`. Every
//! video appears in every cache's ranking, including those with zero
//! importance. Rankings are sorted by descending importance; ties keep
//! catalogue order (stable sort).

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::model::{CacheId, Instance, VideoId};

/// One entry of a cache's ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedVideo {
    pub video: VideoId,
    pub importance: i64,
}

/// Per-cache rankings, indexed by cache id. Read-only once computed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportanceTable {
    per_cache: Vec<Vec<RankedVideo>>,
}

impl ImportanceTable {
    /// Ranks videos for every cache of `instance`.
    ///
    /// With the `parallel` feature caches are ranked concurrently; the
    /// result is identical to the sequential one.
    pub fn compute(instance: &Instance) -> Self {
        let ids: Vec<CacheId> = instance.cache_ids().collect();

        #[cfg(feature = "parallel")]
        let per_cache = ids.par_iter().map(|&c| rank(instance, c)).collect();
        #[cfg(not(feature = "parallel"))]
        let per_cache = ids.iter().map(|&c| rank(instance, c)).collect();

        tracing::debug!(caches = ids.len(), "importance table computed");
        Self { per_cache }
    }

    /// Ranking for `cache`, best first.
    #[inline]
    pub fn for_cache(&self, cache: CacheId) -> &[RankedVideo] {
        &self.per_cache[cache.index()]
    }

    /// Number of caches covered.
    pub fn len(&self) -> usize {
        self.per_cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_cache.is_empty()
    }

    /// Rankings in cache id order.
    pub fn iter(&self) -> impl Iterator<Item = (CacheId, &[RankedVideo])> {
        self.per_cache
            .iter()
            .enumerate()
            .map(|(i, r)| (CacheId(i), r.as_slice()))
    }
}

/// Ranks all videos of `instance` for a single cache.
///
/// Pure and deterministic: the same instance always yields the same
/// sequence, including the order of ties.
pub fn rank(instance: &Instance, cache: CacheId) -> Vec<RankedVideo> {
    let mut ranked: Vec<RankedVideo> = instance
        .videos()
        .iter()
        .map(|video| RankedVideo {
            video: video.id,
            importance: importance(instance, cache, video.id),
        })
        .collect();

    // sort_by is stable: equal importance keeps catalogue order
    ranked.sort_by(|a, b| b.importance.cmp(&a.importance));
    ranked
}

/// Importance of placing `video` on `cache`.
pub fn importance(instance: &Instance, cache: CacheId, video: VideoId) -> i64 {
    let size = i128::from(instance.video_size(video));
    let total: i128 = instance
        .requests()
        .for_video(video)
        .iter()
        .filter_map(|r| {
            let endpoint = instance.endpoint(r.endpoint);
            let latency = endpoint.latency_to(cache)?;
            let saved = i128::from(endpoint.origin_latency()) - i128::from(latency);
            Some(div_ceil(saved * i128::from(r.count), size))
        })
        .sum();
    saturate(total)
}

/// Ceiling division for a positive divisor.
fn div_ceil(n: i128, d: i128) -> i128 {
    let q = n / d;
    if n % d > 0 {
        q + 1
    } else {
        q
    }
}

fn saturate(v: i128) -> i64 {
    i64::try_from(v).unwrap_or(if v > 0 { i64::MAX } else { i64::MIN })
}
