//! Cache → video-set assignment.

use std::collections::BTreeSet;

use crate::error::AllocationError;
use crate::model::{CacheId, Instance, VideoId};

/// Assignment of videos to caches.
///
/// Dense over cache ids: every cache of the instance has a (possibly
/// empty) set. Sets are ordered so that "pick a member" can be expressed
/// as an index into a stable view. The used space of each cache is kept
/// alongside and updated by [`insert`](Self::insert) and
/// [`remove`](Self::remove), which read video sizes from the instance.
///
/// The data model permits the same video on several caches.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allocation {
    caches: Vec<BTreeSet<VideoId>>,
    used: Vec<u64>,
}

impl Allocation {
    /// Empty allocation over `num_caches` caches.
    pub fn empty(num_caches: usize) -> Self {
        Self {
            caches: vec![BTreeSet::new(); num_caches],
            used: vec![0; num_caches],
        }
    }

    /// Empty allocation sized for `instance`.
    pub fn for_instance(instance: &Instance) -> Self {
        Self::empty(instance.num_caches())
    }

    /// Number of caches (empty ones included).
    #[inline]
    pub fn num_caches(&self) -> usize {
        self.caches.len()
    }

    /// `true` when at least one cache holds a video.
    pub fn has_placements(&self) -> bool {
        self.caches.iter().any(|s| !s.is_empty())
    }

    /// Videos on `cache`, ascending.
    #[inline]
    pub fn videos(&self, cache: CacheId) -> &BTreeSet<VideoId> {
        &self.caches[cache.index()]
    }

    #[inline]
    pub fn contains(&self, cache: CacheId, video: VideoId) -> bool {
        self.caches[cache.index()].contains(&video)
    }

    /// Storage used on `cache`.
    #[inline]
    pub fn used(&self, cache: CacheId) -> u64 {
        self.used[cache.index()]
    }

    /// Number of videos on `cache`.
    #[inline]
    pub fn count(&self, cache: CacheId) -> usize {
        self.caches[cache.index()].len()
    }

    /// Adds `video` to `cache`. Returns `false` if it was already there.
    pub fn insert(&mut self, instance: &Instance, cache: CacheId, video: VideoId) -> bool {
        let added = self.caches[cache.index()].insert(video);
        if added {
            self.used[cache.index()] += instance.video_size(video);
        }
        added
    }

    /// Removes `video` from `cache`. Returns `false` if it was absent.
    pub fn remove(&mut self, instance: &Instance, cache: CacheId, video: VideoId) -> bool {
        let removed = self.caches[cache.index()].remove(&video);
        if removed {
            self.used[cache.index()] = self.used[cache.index()].saturating_sub(instance.video_size(video));
        }
        removed
    }

    /// Iterates over `(cache, videos)` in cache id order.
    pub fn iter(&self) -> impl Iterator<Item = (CacheId, &BTreeSet<VideoId>)> {
        self.caches.iter().enumerate().map(|(i, s)| (CacheId(i), s))
    }

    /// Caches holding at least one video, ascending.
    pub fn non_empty_caches(&self) -> impl Iterator<Item = CacheId> + '_ {
        self.iter().filter(|(_, s)| !s.is_empty()).map(|(c, _)| c)
    }

    /// Total number of (cache, video) placements.
    pub fn total_placements(&self) -> usize {
        self.caches.iter().map(BTreeSet::len).sum()
    }

    /// `true` if `video` is on any cache.
    pub fn is_placed(&self, video: VideoId) -> bool {
        self.caches.iter().any(|s| s.contains(&video))
    }

    /// `true` if every cache's tracked used space fits its capacity.
    ///
    /// O(caches). Assumes the allocation was only changed through
    /// [`insert`](Self::insert) and [`remove`](Self::remove) with
    /// `instance`; use [`check_capacity`](Self::check_capacity) for an
    /// allocation of unknown origin.
    pub fn is_within_capacity(&self, instance: &Instance) -> bool {
        self.caches.len() == instance.num_caches()
            && instance
                .caches()
                .iter()
                .all(|cache| self.used[cache.id.index()] <= cache.capacity)
    }

    /// Checks the capacity invariant against `instance`, recomputing each
    /// cache's used space from the instance's video sizes.
    ///
    /// # Errors
    ///
    /// Returns a mismatch if the allocation was sized for another
    /// instance, a placement of a video the instance does not have, a
    /// tracked usage that disagrees with the recomputed one, or the first
    /// cache (by id) whose used space exceeds its capacity.
    pub fn check_capacity(&self, instance: &Instance) -> Result<(), AllocationError> {
        if self.caches.len() != instance.num_caches() || self.used.len() != self.caches.len() {
            return Err(AllocationError::CacheCountMismatch {
                expected: instance.num_caches(),
                found: self.caches.len(),
            });
        }
        for cache in instance.caches() {
            let mut actual = 0u64;
            for &video in &self.caches[cache.id.index()] {
                let size = instance
                    .videos()
                    .get(video.index())
                    .map(|v| v.size)
                    .ok_or(AllocationError::UnknownVideo {
                        cache: cache.id,
                        video,
                    })?;
                actual = actual.saturating_add(size);
            }
            let recorded = self.used[cache.id.index()];
            if recorded != actual {
                return Err(AllocationError::UsageMismatch {
                    cache: cache.id,
                    recorded,
                    actual,
                });
            }
            if actual > cache.capacity {
                return Err(AllocationError::CapacityExceeded {
                    cache: cache.id,
                    used: actual,
                    capacity: cache.capacity,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Endpoint;

    fn instance(sizes: &[u64], capacities: &[u64]) -> Instance {
        Instance::new(sizes, capacities, vec![Endpoint::new(1, [])], []).unwrap()
    }

    #[test]
    fn test_insert_remove_track_usage() {
        let inst = instance(&[1, 2, 1, 5], &[10, 10]);
        let mut a = Allocation::for_instance(&inst);
        assert_eq!(a.num_caches(), 2);
        assert!(!a.has_placements());

        assert!(a.insert(&inst, CacheId(0), VideoId(3)));
        assert!(!a.insert(&inst, CacheId(0), VideoId(3)));
        assert!(a.insert(&inst, CacheId(0), VideoId(1)));
        assert_eq!(a.used(CacheId(0)), 7);
        assert_eq!(a.count(CacheId(0)), 2);
        assert!(a.has_placements());

        assert!(a.remove(&inst, CacheId(0), VideoId(3)));
        assert!(!a.remove(&inst, CacheId(0), VideoId(3)));
        assert_eq!(a.used(CacheId(0)), 2);
        assert_eq!(a.non_empty_caches().collect::<Vec<_>>(), vec![CacheId(0)]);
        assert_eq!(a.total_placements(), 1);
        assert!(a.is_placed(VideoId(1)));
        assert!(!a.is_placed(VideoId(3)));
    }

    #[test]
    fn test_check_capacity() {
        let inst = instance(&[3, 2], &[4, 4]);
        let mut a = Allocation::for_instance(&inst);
        a.insert(&inst, CacheId(1), VideoId(0));
        assert!(a.is_within_capacity(&inst));
        assert_eq!(a.check_capacity(&inst), Ok(()));

        a.insert(&inst, CacheId(1), VideoId(1));
        assert!(!a.is_within_capacity(&inst));
        assert_eq!(
            a.check_capacity(&inst),
            Err(AllocationError::CapacityExceeded {
                cache: CacheId(1),
                used: 5,
                capacity: 4
            })
        );

        let wrong = Allocation::empty(3);
        assert!(!wrong.is_within_capacity(&inst));
        assert!(matches!(
            wrong.check_capacity(&inst),
            Err(AllocationError::CacheCountMismatch { .. })
        ));
    }

    #[test]
    fn test_check_capacity_uses_instance_sizes() {
        // same shape, but video 0 is ten times larger in `big`
        let small = instance(&[1], &[3]);
        let big = instance(&[10], &[3]);
        let mut a = Allocation::for_instance(&small);
        a.insert(&small, CacheId(0), VideoId(0));
        assert!(a.is_within_capacity(&small));

        assert_eq!(
            a.check_capacity(&big),
            Err(AllocationError::UsageMismatch {
                cache: CacheId(0),
                recorded: 1,
                actual: 10
            })
        );

        let mut b = Allocation::for_instance(&big);
        b.insert(&big, CacheId(0), VideoId(0));
        assert_eq!(
            b.check_capacity(&big),
            Err(AllocationError::CapacityExceeded {
                cache: CacheId(0),
                used: 10,
                capacity: 3
            })
        );
    }

    #[test]
    fn test_check_capacity_unknown_video() {
        let wide = instance(&[1, 1, 1], &[5]);
        let narrow = instance(&[1], &[5]);
        let mut a = Allocation::for_instance(&wide);
        a.insert(&wide, CacheId(0), VideoId(2));
        assert_eq!(
            a.check_capacity(&narrow),
            Err(AllocationError::UnknownVideo {
                cache: CacheId(0),
                video: VideoId(2)
            })
        );
    }

    #[test]
    fn test_remove_with_other_instance_does_not_underflow() {
        let small = instance(&[1], &[3]);
        let big = instance(&[10], &[3]);
        let mut a = Allocation::for_instance(&small);
        a.insert(&small, CacheId(0), VideoId(0));
        assert!(a.remove(&big, CacheId(0), VideoId(0)));
        assert_eq!(a.used(CacheId(0)), 0);
    }
}
