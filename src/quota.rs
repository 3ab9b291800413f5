//! Upstream call budget arithmetic.
//!
//! Every shard costs `ceil(per_shard_limit / 10)` calls since the API serves
//! at most 10 results per request. The estimate is checked before a run
//! starts; there is no server-side enforcement to fall back on.

use tracing::debug;

/// Results the upstream API returns per request at most.
pub const PAGE_SIZE: usize = 10;

/// Results the upstream API returns per query at most.
pub const MAX_RESULTS_PER_QUERY: usize = 100;

/// Calls needed to pull `per_shard_limit` results from each of `shard_count` shards.
pub fn estimate_calls(shard_count: usize, per_shard_limit: usize) -> usize {
    shard_count * per_shard_limit.div_ceil(PAGE_SIZE)
}

/// Upper bound on results collected before deduplication.
pub fn estimate_result_cap(shard_count: usize, per_shard_limit: usize) -> usize {
    shard_count * per_shard_limit
}

/// Check a plan against a call budget. Returns `(ok, estimated_calls)`.
pub fn validate_budget(shard_count: usize, per_shard_limit: usize, budget: usize) -> (bool, usize) {
    let estimated = estimate_calls(shard_count, per_shard_limit);
    let ok = estimated <= budget;
    debug!(shard_count, per_shard_limit, budget, estimated, ok, "Validated call budget");
    (ok, estimated)
}

/// Largest per-shard limit (at most 100, a multiple of 10) that keeps
/// `shard_count` shards within `budget` calls. `0` means infeasible.
pub fn max_per_shard_limit(shard_count: usize, budget: usize) -> usize {
    if shard_count == 0 {
        return 0;
    }
    let pages_per_shard = budget / shard_count;
    (PAGE_SIZE * pages_per_shard).min(MAX_RESULTS_PER_QUERY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_matches_formula() {
        for shards in 1..=40 {
            for limit in 1..=100 {
                let pages = (limit + 9) / 10;
                assert_eq!(estimate_calls(shards, limit), shards * pages);
            }
        }
    }

    #[test]
    fn test_validate_over_budget() {
        assert_eq!(estimate_calls(5, 50), 25);
        assert_eq!(validate_budget(5, 50, 20), (false, 25));
        assert_eq!(validate_budget(5, 40, 20), (true, 20));
    }

    #[test]
    fn test_max_per_shard_limit() {
        assert_eq!(max_per_shard_limit(5, 20), 40);
        assert_eq!(max_per_shard_limit(3, 1000), 100);
        assert_eq!(max_per_shard_limit(10, 9), 0);
        assert_eq!(max_per_shard_limit(0, 100), 0);
    }

    #[test]
    fn test_max_limit_always_fits_budget() {
        for shards in 1..=30 {
            for budget in 1..=120 {
                let limit = max_per_shard_limit(shards, budget);
                if limit > 0 {
                    assert!(estimate_calls(shards, limit) <= budget);
                    assert!(limit <= MAX_RESULTS_PER_QUERY);
                }
            }
        }
    }

    #[test]
    fn test_result_cap() {
        assert_eq!(estimate_result_cap(3, 50), 150);
    }
}
