//! Immutable problem instance: videos, endpoints, caches and request volumes.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ModelError;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub usize);

        impl $name {
            /// Returns the zero-based index.
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }
    };
}

id_type!(
    /// Identifier of a video (its position in the catalogue).
    VideoId
);
id_type!(
    /// Identifier of an endpoint.
    EndpointId
);
id_type!(
    /// Identifier of an edge cache.
    CacheId
);

/// A content item with a fixed storage size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Video {
    pub id: VideoId,
    pub size: u64,
}

/// An edge cache with a fixed capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cache {
    pub id: CacheId,
    pub capacity: u64,
}

/// Latency from an endpoint to one reachable cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheLink {
    pub cache: CacheId,
    pub latency: u64,
}

/// A population of clients sharing the same latencies.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Endpoint {
    origin_latency: u64,
    /// Sorted by cache id, no duplicates.
    links: Vec<CacheLink>,
}

impl Endpoint {
    /// Creates an endpoint. Links may be given in any order.
    pub fn new(origin_latency: u64, links: impl IntoIterator<Item = (CacheId, u64)>) -> Self {
        let mut links: Vec<CacheLink> = links
            .into_iter()
            .map(|(cache, latency)| CacheLink { cache, latency })
            .collect();
        links.sort_by_key(|l| l.cache);
        Self {
            origin_latency,
            links,
        }
    }

    /// Latency to the origin data center.
    #[inline]
    pub fn origin_latency(&self) -> u64 {
        self.origin_latency
    }

    /// Reachable caches in ascending id order.
    #[inline]
    pub fn links(&self) -> &[CacheLink] {
        &self.links
    }

    /// Latency to `cache`, or `None` if the cache is not reachable.
    pub fn latency_to(&self, cache: CacheId) -> Option<u64> {
        self.links
            .binary_search_by_key(&cache, |l| l.cache)
            .ok()
            .map(|i| self.links[i].latency)
    }
}

/// Request volume for one (video, endpoint) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Request {
    pub video: VideoId,
    pub endpoint: EndpointId,
    pub count: u64,
}

/// Non-zero request counts grouped by video, each group ordered by endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestProfile {
    by_video: Vec<Vec<Request>>,
    total: u64,
}

impl RequestProfile {
    /// Requests for `video`. Empty when nobody asks for it.
    #[inline]
    pub fn for_video(&self, video: VideoId) -> &[Request] {
        &self.by_video[video.index()]
    }

    /// All requests, grouped by video.
    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.by_video.iter().flatten()
    }

    /// Number of distinct (video, endpoint) pairs with requests.
    pub fn len(&self) -> usize {
        self.by_video.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Sum of all request counts.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }
}

/// The full, immutable problem description.
///
/// Built once from parsed input and shared read-only by ranking,
/// seeding, scoring and the search loop.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instance {
    videos: Vec<Video>,
    endpoints: Vec<Endpoint>,
    caches: Vec<Cache>,
    requests: RequestProfile,
}

impl Instance {
    /// Builds an instance, checking every cross reference.
    ///
    /// Requests with a zero count are dropped. If the same (video,
    /// endpoint) pair appears more than once, the last count wins.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] for zero sizes or capacities, links to
    /// unknown caches, duplicate links, requests naming unknown videos or
    /// endpoints, and request counts whose sum overflows `u64`.
    pub fn new(
        video_sizes: &[u64],
        cache_capacities: &[u64],
        endpoints: Vec<Endpoint>,
        requests: impl IntoIterator<Item = Request>,
    ) -> Result<Self, ModelError> {
        let videos = video_sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                if size == 0 {
                    Err(ModelError::ZeroVideoSize(VideoId(i)))
                } else {
                    Ok(Video {
                        id: VideoId(i),
                        size,
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let caches = cache_capacities
            .iter()
            .enumerate()
            .map(|(i, &capacity)| {
                if capacity == 0 {
                    Err(ModelError::ZeroCapacity(CacheId(i)))
                } else {
                    Ok(Cache {
                        id: CacheId(i),
                        capacity,
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (e, endpoint) in endpoints.iter().enumerate() {
            for pair in endpoint.links.windows(2) {
                if pair[0].cache == pair[1].cache {
                    return Err(ModelError::DuplicateLink {
                        endpoint: EndpointId(e),
                        cache: pair[0].cache,
                    });
                }
            }
            if let Some(link) = endpoint.links.iter().find(|l| l.cache.index() >= caches.len()) {
                return Err(ModelError::UnknownCache {
                    endpoint: EndpointId(e),
                    cache: link.cache,
                });
            }
        }

        let mut merged: BTreeMap<(VideoId, EndpointId), u64> = BTreeMap::new();
        for r in requests {
            if r.video.index() >= videos.len() {
                return Err(ModelError::UnknownVideo(r.video));
            }
            if r.endpoint.index() >= endpoints.len() {
                return Err(ModelError::UnknownEndpoint(r.endpoint));
            }
            merged.insert((r.video, r.endpoint), r.count);
        }

        let mut by_video: Vec<Vec<Request>> = vec![Vec::new(); videos.len()];
        let mut total = 0u64;
        for ((video, endpoint), count) in merged {
            if count == 0 {
                continue;
            }
            total = total
                .checked_add(count)
                .ok_or(ModelError::RequestTotalOverflow)?;
            by_video[video.index()].push(Request {
                video,
                endpoint,
                count,
            });
        }

        Ok(Self {
            videos,
            endpoints,
            caches,
            requests: RequestProfile { by_video, total },
        })
    }

    #[inline]
    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    #[inline]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    #[inline]
    pub fn caches(&self) -> &[Cache] {
        &self.caches
    }

    #[inline]
    pub fn requests(&self) -> &RequestProfile {
        &self.requests
    }

    #[inline]
    pub fn video_size(&self, video: VideoId) -> u64 {
        self.videos[video.index()].size
    }

    #[inline]
    pub fn capacity(&self, cache: CacheId) -> u64 {
        self.caches[cache.index()].capacity
    }

    #[inline]
    pub fn endpoint(&self, endpoint: EndpointId) -> &Endpoint {
        &self.endpoints[endpoint.index()]
    }

    pub fn num_videos(&self) -> usize {
        self.videos.len()
    }

    pub fn num_endpoints(&self) -> usize {
        self.endpoints.len()
    }

    pub fn num_caches(&self) -> usize {
        self.caches.len()
    }

    /// Sum of all request counts.
    pub fn total_requests(&self) -> u64 {
        self.requests.total
    }

    /// Cache ids in ascending order.
    pub fn cache_ids(&self) -> impl Iterator<Item = CacheId> + '_ {
        self.caches.iter().map(|c| c.id)
    }
}
