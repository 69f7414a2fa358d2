//! Mutation commands and their exact inverses.

use crate::allocation::Allocation;
use crate::model::{CacheId, Instance, VideoId};

/// Structural move family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveKind {
    /// Exchange one video between two non-empty caches.
    Swap,
    /// Insert one video into one cache.
    Add,
}

/// Which videos the Add move may insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddPolicy {
    /// Any video not already on the chosen cache. Copies on other caches
    /// are allowed, so a popular video can serve several endpoint groups.
    #[default]
    AllowDuplicates,
    /// Only videos that are on no cache at all, preserving the global
    /// uniqueness of the greedy seed.
    Exclusive,
}

/// An applied mutation, holding what is needed to reverse it.
///
/// Produced by [`MutationEngine`](super::MutationEngine); the allocation has
/// already been changed when a `Mutation` is returned. Calling
/// [`undo`](Self::undo) on the same allocation restores it exactly,
/// including per-cache usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a mutation must be kept or undone"]
pub enum Mutation {
    /// `first_video` moved from `first` to `second` and `second_video`
    /// moved the other way. The `*_gained` flags record whether the
    /// receiving cache actually gained the video (it may already have
    /// held a copy).
    Swap {
        first: CacheId,
        first_video: VideoId,
        second: CacheId,
        second_video: VideoId,
        first_gained: bool,
        second_gained: bool,
    },
    /// `video` inserted into `cache`.
    Add { cache: CacheId, video: VideoId },
    /// No move of this kind was possible; nothing changed.
    Noop(MoveKind),
}

impl Mutation {
    /// The move family attempted.
    pub fn kind(&self) -> MoveKind {
        match self {
            Mutation::Swap { .. } => MoveKind::Swap,
            Mutation::Add { .. } => MoveKind::Add,
            Mutation::Noop(kind) => *kind,
        }
    }

    /// `true` if the allocation was left untouched.
    pub fn is_noop(&self) -> bool {
        matches!(self, Mutation::Noop(_))
    }

    /// Reverts this mutation on `allocation`.
    pub fn undo(self, allocation: &mut Allocation, instance: &Instance) {
        match self {
            Mutation::Swap {
                first,
                first_video,
                second,
                second_video,
                first_gained,
                second_gained,
            } => {
                if first_gained {
                    allocation.remove(instance, first, second_video);
                }
                if second_gained {
                    allocation.remove(instance, second, first_video);
                }
                allocation.insert(instance, first, first_video);
                allocation.insert(instance, second, second_video);
            }
            Mutation::Add { cache, video } => {
                allocation.remove(instance, cache, video);
            }
            Mutation::Noop(_) => {}
        }
    }
}
