//! Data models shared by the planner, the fetchers and the exporters.
//!
//! - [`DateShard`]: one slice of the requested date interval
//! - [`SearchResult`]: a single upstream hit with its shard provenance
//! - [`QuotaPlan`]: the call/result estimate for a (granularity, limit) pair
//! - [`ResultSet`]: merged results, unique by link

use crate::quota;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the date shards a range is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Granularity {
    Monthly,
    Weekly,
    Daily,
}

impl Granularity {
    /// Coarsest first. The auto optimizer walks granularities in this order.
    pub const ALL: [Granularity; 3] = [Granularity::Monthly, Granularity::Weekly, Granularity::Daily];
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Monthly => "Monthly",
            Granularity::Weekly => "Weekly",
            Granularity::Daily => "Daily",
        };
        f.write_str(name)
    }
}

/// A closed date interval `[start, end]` with a display label.
///
/// Shards produced by one call to [`crate::shard::plan_shards`] are ordered,
/// contiguous and non-overlapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateShard {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

impl DateShard {
    /// Number of calendar days covered, inclusive of both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Search backend locale parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    /// Geolocation (`gl`), e.g. `"id"`.
    pub gl: String,
    /// Interface language (`hl`), e.g. `"id"`.
    pub hl: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            gl: "id".to_string(),
            hl: "id".to_string(),
        }
    }
}

/// Article body fields filled in by the optional enrichment step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDetails {
    pub title: String,
    pub text: String,
    pub author: String,
    pub published: String,
}

/// One upstream hit. Identity is `link`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    /// 1-based rank within the shard's query, in fetch order.
    pub position: usize,
    pub shard_label: Option<String>,
    pub shard_start: Option<NaiveDate>,
    pub shard_end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<ArticleDetails>,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
        position: usize,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
            position,
            shard_label: None,
            shard_start: None,
            shard_end: None,
            article: None,
        }
    }

    /// Attach the provenance of the shard this hit was fetched for.
    pub fn with_shard(mut self, shard: &DateShard) -> Self {
        self.shard_label = Some(shard.label.clone());
        self.shard_start = Some(shard.start);
        self.shard_end = Some(shard.end);
        self
    }
}

/// Call and result estimate for running `shard_count` shards at `per_shard_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPlan {
    pub granularity: Granularity,
    pub per_shard_limit: usize,
    pub shard_count: usize,
    pub estimated_calls: usize,
    pub estimated_result_cap: usize,
}

impl QuotaPlan {
    pub fn new(granularity: Granularity, shard_count: usize, per_shard_limit: usize) -> Self {
        Self {
            granularity,
            per_shard_limit,
            shard_count,
            estimated_calls: quota::estimate_calls(shard_count, per_shard_limit),
            estimated_result_cap: quota::estimate_result_cap(shard_count, per_shard_limit),
        }
    }
}

impl fmt::Display for QuotaPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | results/shard {} | shards {} | estimated calls {} | result cap {}",
            self.granularity,
            self.per_shard_limit,
            self.shard_count,
            self.estimated_calls,
            self.estimated_result_cap
        )
    }
}

/// Results deduplicated by link, first occurrence kept, insertion order preserved.
///
/// Only [`crate::aggregate::merge`] builds one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultSet(pub(crate) Vec<SearchResult>);

impl ResultSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchResult> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[SearchResult] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<SearchResult> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a SearchResult;
    type IntoIter = std::slice::Iter<'a, SearchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
