//! Run orchestration: pre-flight checks, the shard loop, and the merge.
//!
//! # Phases
//!
//! 1. [`prepare`] validates the request and produces a [`QuotaPlan`]. Any
//!    failure here rejects the whole run before an upstream call is made.
//! 2. [`execute`] walks the shards in chronological order, one at a time.
//!    A shard whose fetch fails is recorded in [`RunReport::failures`] and
//!    the loop moves on; hits from other shards are kept.
//! 3. Shard outputs are merged and deduplicated by link.
//!
//! The core holds no state between runs. The returned [`RunReport`] is the
//! snapshot the caller keeps.

use crate::aggregate::merge;
use crate::api::PageSource;
use crate::error::{Result, SearchError};
use crate::models::{ArticleDetails, Granularity, QuotaPlan, ResultSet, SearchResult};
use crate::optimizer::plan_auto;
use crate::paging::fetch_paginated;
use crate::quota::MAX_RESULTS_PER_QUERY;
use crate::shard::{plan_shards, rewrite_query};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{error, info, instrument, warn};

/// How the (granularity, per-shard limit) pair is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Caller picks both; the plan must fit the budget.
    Manual {
        granularity: Granularity,
        per_shard_limit: usize,
    },
    /// The auto optimizer picks both to reach `target_results`.
    Auto { target_results: usize },
}

/// Parameters of one sharded search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub base_query: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Maximum number of upstream calls the run may spend.
    pub call_budget: usize,
    pub mode: RunMode,
}

impl SearchRequest {
    pub fn mode_name(&self) -> &'static str {
        match self.mode {
            RunMode::Manual { .. } => "manual",
            RunMode::Auto { .. } => "auto",
        }
    }
}

/// A shard whose fetch failed, with the reason shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardFailure {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub reason: String,
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub plan: QuotaPlan,
    /// Every hit in fetch order, before deduplication.
    pub raw: Vec<SearchResult>,
    /// Hits unique by link.
    pub results: ResultSet,
    pub failures: Vec<ShardFailure>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Copy article details from the merged results onto every raw hit
    /// with the same link, duplicates included.
    ///
    /// Call after enrichment so the raw dump carries the extracted fields.
    pub fn attach_articles_to_raw(&mut self) {
        let articles: HashMap<&str, &ArticleDetails> = self
            .results
            .iter()
            .filter_map(|hit| hit.article.as_ref().map(|a| (hit.link.as_str(), a)))
            .collect();
        for hit in &mut self.raw {
            if let Some(article) = articles.get(hit.link.as_str()) {
                hit.article = Some((*article).clone());
            }
        }
    }
}

/// Validate `request` and produce the plan to run. Makes no upstream calls.
#[instrument(level = "info", skip_all, fields(mode = request.mode_name(), start = %request.start, end = %request.end))]
pub fn prepare(request: &SearchRequest) -> Result<QuotaPlan> {
    if request.base_query.trim().is_empty() {
        return Err(SearchError::input("the search query is empty"));
    }
    if request.start > request.end {
        return Err(SearchError::input(format!(
            "start date {} is after end date {}",
            request.start, request.end
        )));
    }
    if request.call_budget == 0 {
        return Err(SearchError::input("the call budget must be at least 1"));
    }

    let plan = match request.mode {
        RunMode::Manual {
            granularity,
            per_shard_limit,
        } => {
            if !(1..=MAX_RESULTS_PER_QUERY).contains(&per_shard_limit) {
                return Err(SearchError::input(format!(
                    "per-shard limit must be between 1 and {MAX_RESULTS_PER_QUERY}, got {per_shard_limit}"
                )));
            }
            let shard_count = plan_shards(request.start, request.end, granularity).len();
            let plan = QuotaPlan::new(granularity, shard_count, per_shard_limit);
            if plan.estimated_calls > request.call_budget {
                return Err(SearchError::QuotaExceeded {
                    estimated: plan.estimated_calls,
                    budget: request.call_budget,
                });
            }
            plan
        }
        RunMode::Auto { target_results } => {
            if target_results == 0 {
                return Err(SearchError::input("the target result count must be at least 1"));
            }
            plan_auto(request.start, request.end, target_results, request.call_budget).ok_or(
                SearchError::NoFeasiblePlan {
                    budget: request.call_budget,
                },
            )?
        }
    };

    info!(%plan, budget = request.call_budget, "Run plan accepted");
    Ok(plan)
}

/// Fetch every shard of `plan` sequentially and merge the hits.
#[instrument(level = "info", skip_all, fields(granularity = %plan.granularity, shards = plan.shard_count))]
pub async fn execute<S: PageSource>(source: &S, request: &SearchRequest, plan: &QuotaPlan) -> RunReport {
    let shards = plan_shards(request.start, request.end, plan.granularity);
    let mut per_shard: Vec<Vec<SearchResult>> = Vec::with_capacity(shards.len());
    let mut failures = Vec::new();

    for (i, shard) in shards.iter().enumerate() {
        let query = rewrite_query(&request.base_query, shard);
        match fetch_paginated(source, &query, plan.per_shard_limit).await {
            Ok(hits) => {
                info!(index = i, label = %shard.label, count = hits.len(), "Shard fetched");
                per_shard.push(hits.into_iter().map(|hit| hit.with_shard(shard)).collect());
            }
            Err(e) => {
                error!(index = i, label = %shard.label, error = %e, "Shard fetch failed; continuing");
                failures.push(ShardFailure {
                    label: shard.label.clone(),
                    start: shard.start,
                    end: shard.end,
                    reason: e.to_string(),
                });
            }
        }
    }

    let raw: Vec<SearchResult> = per_shard.iter().flatten().cloned().collect();
    let results = merge(per_shard);

    if failures.is_empty() {
        info!(raw = raw.len(), unique = results.len(), "Run complete");
    } else {
        warn!(
            raw = raw.len(),
            unique = results.len(),
            failed_shards = failures.len(),
            "Run finished with failed shards"
        );
    }

    RunReport {
        plan: *plan,
        raw,
        results,
        failures,
    }
}

/// [`prepare`] then [`execute`].
pub async fn run<S: PageSource>(source: &S, request: &SearchRequest) -> Result<RunReport> {
    let plan = prepare(request)?;
    Ok(execute(source, request, &plan).await)
}
