//! Greedy seeding from the importance table.

use super::types::Allocation;
use crate::model::Instance;
use crate::ranking::ImportanceTable;

/// Builds the deterministic greedy seed allocation.
///
/// Caches are visited in id order. Each cache walks its ranking and admits
/// a video when it fits the remaining capacity and has not been placed on
/// any cache yet. The global uniqueness rule is a property of this seeding
/// heuristic only; the search may later place a video on several caches.
pub struct InitialAllocator;

impl InitialAllocator {
    /// Builds the seed. The result always satisfies the capacity invariant.
    pub fn build(table: &ImportanceTable, instance: &Instance) -> Allocation {
        let mut allocation = Allocation::for_instance(instance);
        let mut placed = vec![false; instance.num_videos()];

        for cache in instance.caches() {
            let mut remaining = cache.capacity;
            for entry in table.for_cache(cache.id) {
                let size = instance.video_size(entry.video);
                if size <= remaining && !placed[entry.video.index()] {
                    placed[entry.video.index()] = true;
                    allocation.insert(instance, cache.id, entry.video);
                    remaining -= size;
                }
            }
        }

        tracing::debug!(
            placements = allocation.total_placements(),
            caches_used = allocation.non_empty_caches().count(),
            "seed allocation built"
        );
        allocation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CacheId, Endpoint, EndpointId, Request, VideoId};

    fn req(video: usize, endpoint: usize, count: u64) -> Request {
        Request {
            video: VideoId(video),
            endpoint: EndpointId(endpoint),
            count,
        }
    }

    #[test]
    fn test_reference_scenario_seed() {
        let inst = Instance::new(
            &[2, 1],
            &[3],
            vec![
                Endpoint::new(100, [(CacheId(0), 20)]),
                Endpoint::new(150, [(CacheId(0), 80)]),
            ],
            [req(0, 0, 1000), req(1, 1, 500)],
        )
        .unwrap();
        let table = ImportanceTable::compute(&inst);
        let a = InitialAllocator::build(&table, &inst);

        let videos: Vec<VideoId> = a.videos(CacheId(0)).iter().copied().collect();
        assert_eq!(videos, vec![VideoId(0), VideoId(1)]);
        assert_eq!(a.used(CacheId(0)), 3);
    }

    #[test]
    fn test_video_placed_at_most_once() {
        // Both caches prefer video 0; only cache 0 gets it.
        let inst = Instance::new(
            &[1, 1],
            &[1, 1],
            vec![Endpoint::new(100, [(CacheId(0), 10), (CacheId(1), 10)])],
            [req(0, 0, 100), req(1, 0, 1)],
        )
        .unwrap();
        let table = ImportanceTable::compute(&inst);
        let a = InitialAllocator::build(&table, &inst);

        assert!(a.contains(CacheId(0), VideoId(0)));
        assert!(!a.contains(CacheId(1), VideoId(0)));
        assert!(a.contains(CacheId(1), VideoId(1)));
    }

    #[test]
    fn test_skips_oversized_and_continues() {
        // Top-ranked video does not fit; smaller ones still admitted.
        let inst = Instance::new(
            &[10, 2, 3],
            &[5],
            vec![Endpoint::new(100, [(CacheId(0), 0)])],
            [req(0, 0, 1000), req(1, 0, 10), req(2, 0, 10)],
        )
        .unwrap();
        let table = ImportanceTable::compute(&inst);
        let a = InitialAllocator::build(&table, &inst);

        assert!(!a.contains(CacheId(0), VideoId(0)));
        assert_eq!(a.used(CacheId(0)), 5);
        assert!(a.is_within_capacity(&inst));
    }
}
