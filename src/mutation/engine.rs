//! Random Swap / Add moves.

use rand::Rng;

use super::types::{AddPolicy, MoveKind, Mutation};
use crate::allocation::Allocation;
use crate::model::{CacheId, Instance, VideoId};

/// Generates random perturbations of an allocation.
///
/// Each call flips a fair coin between [`MoveKind::Swap`] and
/// [`MoveKind::Add`], applies the move in place, and returns the
/// [`Mutation`] that undoes it. No capacity check is made here.
///
/// Every random choice is a uniform draw over the eligible candidates
/// listed in ascending id order, so a fixed seed always proposes the same
/// sequence of moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationEngine {
    policy: AddPolicy,
}

impl MutationEngine {
    pub fn new(policy: AddPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AddPolicy {
        self.policy
    }

    /// Applies a random move to `allocation`.
    pub fn mutate<R: Rng>(
        &self,
        instance: &Instance,
        allocation: &mut Allocation,
        rng: &mut R,
    ) -> Mutation {
        if rng.random_bool(0.5) {
            self.swap(instance, allocation, rng)
        } else {
            self.add(instance, allocation, rng)
        }
    }

    /// Moves one video from each of two distinct non-empty caches into
    /// the other.
    ///
    /// Returns [`Mutation::Noop`] when fewer than two caches hold videos.
    pub fn swap<R: Rng>(
        &self,
        instance: &Instance,
        allocation: &mut Allocation,
        rng: &mut R,
    ) -> Mutation {
        let candidates: Vec<CacheId> = allocation.non_empty_caches().collect();
        if candidates.len() < 2 {
            return Mutation::Noop(MoveKind::Swap);
        }

        let i = rng.random_range(0..candidates.len());
        let mut j = rng.random_range(0..candidates.len() - 1);
        if j >= i {
            j += 1;
        }
        let (first, second) = (candidates[i], candidates[j]);

        let first_video = pick_member(allocation, first, rng);
        let second_video = pick_member(allocation, second, rng);

        allocation.remove(instance, first, first_video);
        allocation.remove(instance, second, second_video);
        let first_gained = allocation.insert(instance, first, second_video);
        let second_gained = allocation.insert(instance, second, first_video);

        Mutation::Swap {
            first,
            first_video,
            second,
            second_video,
            first_gained,
            second_gained,
        }
    }

    /// Inserts one video into one cache, subject to the [`AddPolicy`].
    ///
    /// Returns [`Mutation::Noop`] when no cache can take another video.
    pub fn add<R: Rng>(
        &self,
        instance: &Instance,
        allocation: &mut Allocation,
        rng: &mut R,
    ) -> Mutation {
        let num_videos = instance.num_videos();

        let (caches, unplaced): (Vec<CacheId>, Vec<VideoId>) = match self.policy {
            AddPolicy::AllowDuplicates => {
                let caches: Vec<CacheId> = instance
                    .cache_ids()
                    .filter(|&c| allocation.count(c) < num_videos)
                    .collect();
                (caches, Vec::new())
            }
            AddPolicy::Exclusive => {
                let mut placed = vec![false; num_videos];
                for (_, videos) in allocation.iter() {
                    for v in videos {
                        placed[v.index()] = true;
                    }
                }
                let unplaced: Vec<VideoId> = (0..num_videos)
                    .filter(|&v| !placed[v])
                    .map(VideoId)
                    .collect();
                let caches: Vec<CacheId> = if unplaced.is_empty() {
                    Vec::new()
                } else {
                    instance.cache_ids().collect()
                };
                (caches, unplaced)
            }
        };

        if caches.is_empty() {
            return Mutation::Noop(MoveKind::Add);
        }
        let cache = caches[rng.random_range(0..caches.len())];

        let video = match self.policy {
            AddPolicy::AllowDuplicates => {
                let present = allocation.videos(cache);
                let missing = num_videos - present.len();
                let k = rng.random_range(0..missing);
                // at least one video is missing, so nth(k) exists
                match (0..num_videos)
                    .map(VideoId)
                    .filter(|v| !present.contains(v))
                    .nth(k)
                {
                    Some(v) => v,
                    None => return Mutation::Noop(MoveKind::Add),
                }
            }
            AddPolicy::Exclusive => unplaced[rng.random_range(0..unplaced.len())],
        };

        allocation.insert(instance, cache, video);
        Mutation::Add { cache, video }
    }
}

/// Uniformly picks a member of a non-empty cache by index into its
/// ascending view.
fn pick_member<R: Rng>(allocation: &Allocation, cache: CacheId, rng: &mut R) -> VideoId {
    let videos = allocation.videos(cache);
    let k = rng.random_range(0..videos.len());
    videos
        .iter()
        .nth(k)
        .copied()
        .unwrap_or_else(|| unreachable!("cache {cache} was selected as non-empty"))
}
