//! Request-weighted latency reduction score.
//!
//! For each requested (video, endpoint) pair the effective latency is the
//! smallest of the origin latency and the latencies to reachable caches
//! that hold the video. The score is
//!
//! ```text
//! ceil(Σ (L_D - L_eff) * n / Σ n * 1000)
//! ```
//!
//! Higher is better. Computed in exact integer arithmetic.

use crate::allocation::Allocation;
use crate::error::ScoreError;
use crate::model::{Instance, Request};

/// Scores `allocation` against `instance`.
///
/// Pure; O(requests × links per endpoint).
///
/// # Errors
///
/// [`ScoreError::NoRequests`] when the instance carries no requests.
pub fn score(instance: &Instance, allocation: &Allocation) -> Result<u64, ScoreError> {
    let total = u128::from(instance.total_requests());
    if total == 0 {
        return Err(ScoreError::NoRequests);
    }

    let saved: u128 = instance
        .requests()
        .iter()
        .map(|r| u128::from(reduction(instance, allocation, r)) * u128::from(r.count))
        .sum();

    let scaled = (saved * 1000).div_ceil(total);
    Ok(u64::try_from(scaled).unwrap_or(u64::MAX))
}

/// Latency saved for one request pair under `allocation`.
pub fn reduction(instance: &Instance, allocation: &Allocation, request: &Request) -> u64 {
    let endpoint = instance.endpoint(request.endpoint);
    let origin = endpoint.origin_latency();
    let best = endpoint
        .links()
        .iter()
        .filter(|l| allocation.contains(l.cache, request.video))
        .map(|l| l.latency)
        .fold(origin, u64::min);
    origin - best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CacheId, Endpoint, EndpointId, VideoId};

    fn req(video: usize, endpoint: usize, count: u64) -> Request {
        Request {
            video: VideoId(video),
            endpoint: EndpointId(endpoint),
            count,
        }
    }

    fn reference_instance() -> Instance {
        Instance::new(
            &[2, 1],
            &[3],
            vec![
                Endpoint::new(100, [(CacheId(0), 20)]),
                Endpoint::new(150, [(CacheId(0), 80)]),
            ],
            [req(0, 0, 1000), req(1, 1, 500)],
        )
        .unwrap()
    }

    #[test]
    fn test_reference_scenario_score() {
        let inst = reference_instance();
        let mut a = Allocation::for_instance(&inst);
        a.insert(&inst, CacheId(0), VideoId(0));
        a.insert(&inst, CacheId(0), VideoId(1));
        // ceil(115000 / 1500 * 1000) = ceil(76666.67)
        assert_eq!(score(&inst, &a), Ok(76_667));
    }

    #[test]
    fn test_empty_allocation_scores_zero() {
        let inst = reference_instance();
        assert_eq!(score(&inst, &Allocation::for_instance(&inst)), Ok(0));
    }

    #[test]
    fn test_no_requests_is_an_error() {
        let inst = Instance::new(&[1], &[1], vec![Endpoint::new(10, [])], []).unwrap();
        assert_eq!(
            score(&inst, &Allocation::for_instance(&inst)),
            Err(ScoreError::NoRequests)
        );
    }

    #[test]
    fn test_slower_cache_never_counts() {
        let inst = Instance::new(
            &[1],
            &[1],
            vec![Endpoint::new(10, [(CacheId(0), 50)])],
            [req(0, 0, 4)],
        )
        .unwrap();
        let mut a = Allocation::for_instance(&inst);
        a.insert(&inst, CacheId(0), VideoId(0));
        assert_eq!(score(&inst, &a), Ok(0));
    }

    #[test]
    fn test_fastest_holding_cache_wins() {
        let inst = Instance::new(
            &[1],
            &[1, 1],
            vec![Endpoint::new(100, [(CacheId(0), 60), (CacheId(1), 10)])],
            [req(0, 0, 1)],
        )
        .unwrap();
        let mut a = Allocation::for_instance(&inst);
        a.insert(&inst, CacheId(0), VideoId(0));
        assert_eq!(score(&inst, &a), Ok(40_000));
        a.insert(&inst, CacheId(1), VideoId(0));
        assert_eq!(score(&inst, &a), Ok(90_000));
    }
}
