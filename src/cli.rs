//! Command-line interface definitions.
//!
//! Credentials can come from flags or from the `GOOGLE_CSE_API_KEY` and
//! `GOOGLE_CSE_CX` environment variables.

use chrono::NaiveDate;
use clap::Parser;
use news_shard_crawler::config::Config;
use news_shard_crawler::models::Granularity;
use news_shard_crawler::run::{RunMode, SearchRequest};
use news_shard_crawler::sources::SourceKind;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Manual plan: monthly shards, 50 results each, at most 300 calls
/// news_shard_crawler -q "AI site:kompas.com" --start 2024-01-01 --end 2024-03-31
///
/// # Let the optimizer pick a plan for 1000 links within 200 calls
/// news_shard_crawler -q "pemilu" --start 2024-01-01 --end 2024-06-30 --auto --target 1000 --max-calls 200
///
/// # Only print the estimate
/// news_shard_crawler -q "banjir" --start 2024-01-01 --end 2024-01-31 -g daily --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Keyword and search operators, e.g. `AI site:kompas.com`
    #[arg(short, long)]
    pub query: String,

    /// First day of the range (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day of the range, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,

    /// Shard width for a manual plan
    #[arg(short, long, value_enum, default_value = "monthly")]
    pub granularity: Granularity,

    /// Results per shard for a manual plan (the API caps a query at 100)
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u16).range(1..=100))]
    pub per_shard_limit: u16,

    /// Maximum number of upstream calls the run may spend
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_calls: u32,

    /// Let the optimizer choose granularity and per-shard limit
    #[arg(long)]
    pub auto: bool,

    /// Number of links the optimizer aims for
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..))]
    pub target: u32,

    /// Search backend
    #[arg(long, value_enum, default_value = "cse")]
    pub source: SourceKind,

    /// Custom Search API key
    #[arg(long, env = "GOOGLE_CSE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Custom Search engine id
    #[arg(long, env = "GOOGLE_CSE_CX", hide_env_values = true)]
    pub cx: Option<String>,

    /// Geolocation override (`gl`)
    #[arg(long)]
    pub gl: Option<String>,

    /// Interface language override (`hl`)
    #[arg(long)]
    pub hl: Option<String>,

    /// Download and extract article bodies after the search
    #[arg(long)]
    pub extract: bool,

    /// Concurrent article downloads
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub max_workers: Option<u8>,

    /// Directory for CSV, Excel and JSON artifacts
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the plan and estimate without calling the backend
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn to_request(&self) -> SearchRequest {
        let mode = if self.auto {
            RunMode::Auto {
                target_results: self.target as usize,
            }
        } else {
            RunMode::Manual {
                granularity: self.granularity,
                per_shard_limit: self.per_shard_limit as usize,
            }
        };
        SearchRequest {
            base_query: self.query.clone(),
            start: self.start,
            end: self.end,
            call_budget: self.max_calls as usize,
            mode,
        }
    }

    /// Flags take precedence over the config file.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(gl) = &self.gl {
            config.gl = gl.clone();
        }
        if let Some(hl) = &self.hl {
            config.hl = hl.clone();
        }
        if let Some(workers) = self.max_workers {
            config.max_workers = workers as usize;
        }
    }
}
