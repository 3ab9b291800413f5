//! # News Shard Crawler
//!
//! Collects more than 100 search results for a keyword by splitting a date
//! range into shards and searching each shard separately with `after:` and
//! `before:` date operators. Targets Indonesian news coverage by default
//! (`gl=id`, `hl=id`).
//!
//! ## Pipeline
//!
//! 1. **Planning**: split `[start, end]` into daily, weekly or monthly shards
//!    ([`shard`]) and estimate upstream calls against a budget ([`quota`]),
//!    or let the [`optimizer`] choose a plan for a target result count
//! 2. **Fetching**: for each shard, page through the backend 10 results at a
//!    time, sequentially and paced ([`paging`], [`api`], [`sources`])
//! 3. **Merging**: flatten shard outputs and deduplicate by link ([`aggregate`])
//! 4. **Enrichment** (optional): download article bodies ([`scrapers`])
//! 5. **Output**: CSV, Excel and a raw JSON dump ([`outputs`])
//!
//! The core functions hold no state; [`run::run`] takes a request and
//! returns a [`run::RunReport`].

pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod optimizer;
pub mod outputs;
pub mod paging;
pub mod quota;
pub mod run;
pub mod scrapers;
pub mod shard;
pub mod sources;
pub mod utils;

pub use error::{Result, SearchError};
pub use models::{DateShard, Granularity, QuotaPlan, ResultSet, SearchResult};
pub use run::{RunMode, RunReport, SearchRequest};
