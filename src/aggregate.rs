//! Merge per-shard results into a single [`ResultSet`].

use crate::models::{ResultSet, SearchResult};
use itertools::Itertools;
use tracing::info;

/// Flatten shard outputs in shard order and keep the first hit for each link.
///
/// Earlier shards win over later ones, and within a shard the earlier
/// position wins. Hits with an empty link are dropped. Provenance fields of
/// the surviving record are untouched.
pub fn merge<I>(shard_results: I) -> ResultSet
where
    I: IntoIterator<Item = Vec<SearchResult>>,
{
    let mut total = 0usize;
    let unique: Vec<SearchResult> = shard_results
        .into_iter()
        .flatten()
        .inspect(|_| total += 1)
        .filter(|hit| !hit.link.is_empty())
        .unique_by(|hit| hit.link.clone())
        .collect();

    info!(total, unique = unique.len(), "Merged shard results");
    ResultSet(unique)
}
