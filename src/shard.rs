//! Date-range sharding and query rewriting.
//!
//! The Custom Search API never returns more than 100 results for a query. To
//! collect more, the requested interval is split into shards and each shard is
//! searched separately with `after:`/`before:` date operators.
//!
//! | Granularity | Boundaries | Label |
//! |-------------|------------|-------|
//! | Monthly | calendar month starts, first/last clipped to the range | `YYYY-MM` |
//! | Weekly | 7-day windows anchored at `start`, last clipped | `wk_YYYY-MM-DD` |
//! | Daily | one shard per day | `YYYY-MM-DD` |

use crate::models::{DateShard, Granularity};
use chrono::{Datelike, Days, Months, NaiveDate};
use tracing::debug;

const ISO_DATE: &str = "%Y-%m-%d";

/// Split `[start, end]` into ordered, contiguous, non-overlapping shards.
///
/// # Arguments
///
/// * `start` - First day of the range, inclusive
/// * `end` - Last day of the range, inclusive
/// * `granularity` - Shard width
///
/// # Returns
///
/// Shards in ascending order whose union is exactly `[start, end]`, or an
/// empty vector when `start > end`.
///
/// # Examples
///
/// ```ignore
/// let shards = plan_shards(jan_1, mar_31, Granularity::Monthly);
/// assert_eq!(shards[0].label, "2024-01");
/// ```
pub fn plan_shards(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> Vec<DateShard> {
    let shards = match granularity {
        _ if start > end => Vec::new(),
        Granularity::Monthly => monthly(start, end),
        Granularity::Weekly => weekly(start, end),
        Granularity::Daily => daily(start, end),
    };
    debug!(%start, %end, %granularity, count = shards.len(), "Planned date shards");
    shards
}

fn monthly(start: NaiveDate, end: NaiveDate) -> Vec<DateShard> {
    let mut shards = Vec::new();
    let Some(mut month_start) = start.with_day(1) else {
        return shards;
    };

    while month_start <= end {
        let next_month = month_start.checked_add_months(Months::new(1));
        let month_end = next_month
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);

        shards.push(DateShard {
            start: month_start.max(start),
            end: month_end.min(end),
            label: month_start.format("%Y-%m").to_string(),
        });

        match next_month {
            Some(next) => month_start = next,
            None => break,
        }
    }
    shards
}

fn weekly(start: NaiveDate, end: NaiveDate) -> Vec<DateShard> {
    let mut shards = Vec::new();
    let mut cur = start;

    loop {
        let week_end = cur
            .checked_add_days(Days::new(6))
            .map_or(end, |d| d.min(end));
        shards.push(DateShard {
            start: cur,
            end: week_end,
            label: format!("wk_{}", cur.format(ISO_DATE)),
        });

        match week_end.succ_opt() {
            Some(next) if next <= end => cur = next,
            _ => break,
        }
    }
    shards
}

fn daily(start: NaiveDate, end: NaiveDate) -> Vec<DateShard> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| DateShard {
            start: d,
            end: d,
            label: d.format(ISO_DATE).to_string(),
        })
        .collect()
}

/// Append `after:<start> before:<end + 1 day>` to the trimmed base query.
///
/// `before:` is exclusive upstream, so the day after `shard.end` keeps the
/// shard's last day inside the search window. The base query is not escaped.
pub fn rewrite_query(base_query: &str, shard: &DateShard) -> String {
    let before = shard.end.succ_opt().unwrap_or(shard.end);
    format!(
        "{} after:{} before:{}",
        base_query.trim(),
        shard.start.format(ISO_DATE),
        before.format(ISO_DATE)
    )
}
