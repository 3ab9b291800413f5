//! Auto-optimizer: pick a granularity and per-shard limit that reaches a
//! target result count within a call budget.
//!
//! # Search
//!
//! Granularities are tried coarsest first (`Monthly`, `Weekly`, `Daily`).
//! For each one the largest affordable per-shard limit is computed, then the
//! smallest limit (at least 10) whose result cap reaches the target. The
//! first granularity that reaches the target wins.
//!
//! If none reaches it, the feasible granularity with the highest result cap
//! at its maximum affordable limit is returned instead; ties go to the
//! coarser one.
//!
//! # Known limitation
//!
//! The search is greedy. It commits to the first granularity that works and
//! never weighs a finer granularity that might reach the same target with
//! fewer calls.

use crate::models::{Granularity, QuotaPlan};
use crate::quota::{max_per_shard_limit, PAGE_SIZE};
use crate::shard::plan_shards;
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

/// Find the cheapest plan reaching `target_results` under `call_budget`.
///
/// # Arguments
///
/// * `start` - First day of the range, inclusive
/// * `end` - Last day of the range, inclusive
/// * `target_results` - Number of links wanted across all shards
/// * `call_budget` - Maximum upstream calls the plan may cost
///
/// # Returns
///
/// The first granularity's plan that reaches the target, else the feasible
/// plan with the highest result cap. `None` when no granularity affords even
/// one call per shard.
#[instrument(level = "info")]
pub fn plan_auto(
    start: NaiveDate,
    end: NaiveDate,
    target_results: usize,
    call_budget: usize,
) -> Option<QuotaPlan> {
    let target = target_results.max(1);
    let candidates: Vec<(Granularity, usize, usize)> = Granularity::ALL
        .into_iter()
        .filter_map(|granularity| {
            let shard_count = plan_shards(start, end, granularity).len();
            let max_limit = max_per_shard_limit(shard_count, call_budget);
            debug!(%granularity, shard_count, max_limit, "Evaluated granularity");
            (max_limit > 0).then_some((granularity, shard_count, max_limit))
        })
        .collect();

    for &(granularity, shard_count, max_limit) in &candidates {
        let needed = target.div_ceil(shard_count);
        let limit = needed.max(PAGE_SIZE).min(max_limit);
        let plan = QuotaPlan::new(granularity, shard_count, limit);
        if plan.estimated_calls <= call_budget && plan.estimated_result_cap >= target {
            info!(%plan, "Auto plan reaches target");
            return Some(plan);
        }
    }

    // Strict comparison keeps the coarser granularity on ties.
    let best = candidates
        .iter()
        .map(|&(granularity, shard_count, max_limit)| QuotaPlan::new(granularity, shard_count, max_limit))
        .fold(None::<QuotaPlan>, |best, plan| match best {
            Some(b) if plan.estimated_result_cap <= b.estimated_result_cap => Some(b),
            _ => Some(plan),
        });

    match &best {
        Some(plan) => info!(%plan, target, "Target unreachable; using highest-capacity plan"),
        None => info!(call_budget, "No granularity fits the call budget"),
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::estimate_calls;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_monthly_plan_when_target_is_modest() {
        // 3 monthly shards: 34 per shard covers the target at 4 calls each.
        let plan = plan_auto(day("2024-01-01"), day("2024-03-31"), 100, 300).unwrap();
        assert_eq!(plan.granularity, Granularity::Monthly);
        assert_eq!(plan.shard_count, 3);
        assert_eq!(plan.per_shard_limit, 34);
        assert_eq!(plan.estimated_calls, 12);
        assert!(plan.estimated_result_cap >= 100);
    }

    #[test]
    fn test_limit_never_below_ten() {
        let plan = plan_auto(day("2024-01-01"), day("2024-03-31"), 1, 300).unwrap();
        assert_eq!(plan.granularity, Granularity::Monthly);
        assert_eq!(plan.per_shard_limit, 10);
    }

    #[test]
    fn test_falls_through_to_finer_granularity() {
        // Monthly tops out at 3 * 100 = 300 results; weekly (13 shards) can reach 1000.
        let plan = plan_auto(day("2024-01-01"), day("2024-03-31"), 1000, 300).unwrap();
        assert_eq!(plan.granularity, Granularity::Weekly);
        assert_eq!(plan.shard_count, 13);
        assert_eq!(plan.per_shard_limit, 77);
        assert_eq!(plan.estimated_calls, estimate_calls(13, 77));
        assert!(plan.estimated_calls <= 300);
    }

    #[test]
    fn test_fallback_picks_highest_capacity() {
        // 91 days; target far above any cap. Budget 100:
        // monthly 3 shards -> 100/shard -> cap 300
        // weekly 13 shards -> 70/shard -> cap 910
        // daily 91 shards -> 10/shard -> cap 910 (tie, weekly kept)
        let plan = plan_auto(day("2024-01-01"), day("2024-03-31"), 100_000, 100).unwrap();
        assert_eq!(plan.granularity, Granularity::Weekly);
        assert_eq!(plan.per_shard_limit, 70);
        assert_eq!(plan.estimated_result_cap, 910);
    }

    #[test]
    fn test_infeasible_budget() {
        // A single month still needs one call; budget zero admits nothing.
        assert!(plan_auto(day("2024-01-01"), day("2024-01-31"), 10, 0).is_none());
    }

    #[test]
    fn test_reversed_range_is_infeasible() {
        assert!(plan_auto(day("2024-02-01"), day("2024-01-01"), 10, 100).is_none());
    }

    #[test]
    fn test_daily_only_when_coarser_cannot_reach() {
        // 10 days: monthly 1 shard (cap 100), weekly 2 shards (cap 200), daily 10 shards (cap 1000).
        let plan = plan_auto(day("2024-01-01"), day("2024-01-10"), 500, 1000).unwrap();
        assert_eq!(plan.granularity, Granularity::Daily);
        assert_eq!(plan.per_shard_limit, 50);
        assert_eq!(plan.estimated_calls, 50);
    }
}
