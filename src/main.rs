//! # News Shard Crawler
//!
//! Collects more than 100 search results for a keyword by splitting a date
//! range into daily, weekly or monthly shards and searching each shard with
//! `after:`/`before:` date operators.
//!
//! ## Usage
//!
//! ```sh
//! GOOGLE_CSE_API_KEY=... GOOGLE_CSE_CX=... \
//!   news_shard_crawler -q "AI site:kompas.com" --start 2024-01-01 --end 2024-06-30 --auto --target 1000
//! ```
//!
//! ## Flow
//!
//! 1. **Planning**: validate inputs and estimate calls against `--max-calls`;
//!    nothing is sent upstream if the plan does not fit
//! 2. **Fetching**: shards run in chronological order, pages of 10, paced
//! 3. **Enrichment** (`--extract`): article bodies, bounded concurrency
//! 4. **Output**: `{prefix}.csv`, `{prefix}.xlsx` and raw `{prefix}.json`

use clap::Parser;
use news_shard_crawler::api::{FixedInterval, PageSource, Paced};
use news_shard_crawler::config::{Config, load_config};
use news_shard_crawler::models::QuotaPlan;
use news_shard_crawler::outputs;
use news_shard_crawler::run::{RunReport, SearchRequest, execute, prepare};
use news_shard_crawler::scrapers::ArticleEnricher;
use news_shard_crawler::sources::cse::{CseClient, CseCredentials};
use news_shard_crawler::sources::google_news::GoogleNewsClient;
use news_shard_crawler::sources::{SourceKind, build_http_client};
use news_shard_crawler::utils::{artifact_prefix, ensure_writable_dir};
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_shard_crawler starting up");

    let args = Cli::parse();
    debug!(query = %args.query, start = %args.start, end = %args.end, source = ?args.source, "Parsed CLI arguments");

    let mut config = load_config(args.config.as_deref()).await?;
    args.apply_overrides(&mut config);

    // ---- Plan ----
    let request = args.to_request();
    let plan = match prepare(&request) {
        Ok(plan) => plan,
        Err(e) => {
            error!(error = %e, "Run rejected before any upstream call");
            return Err(e.into());
        }
    };

    if args.dry_run {
        println!("{plan}");
        info!("Dry run; no requests sent");
        return Ok(());
    }

    // Fail on an unwritable output dir before spending quota
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    // ---- Fetch ----
    let http = build_http_client(&config)?;
    let mut report = match args.source {
        SourceKind::Cse => {
            let credentials = CseCredentials::new(args.api_key.clone(), args.cx.clone())?;
            let client = CseClient::new(http.clone(), &config.cse_endpoint, credentials, config.locale())?;
            search(client, &config, &request, &plan).await
        }
        SourceKind::GoogleNews => {
            let client = GoogleNewsClient::new(http.clone(), &config.google_news_endpoint, config.locale());
            search(client, &config, &request, &plan).await
        }
    };

    for failure in &report.failures {
        warn!(label = %failure.label, reason = %failure.reason, "Shard returned no results");
    }

    // ---- Enrich ----
    if args.extract && !report.results.is_empty() {
        let enricher = ArticleEnricher::new(
            http,
            config.workers(),
            config.article_timeout(),
            config.article_deadline(),
        );
        report.results = enricher.enrich(report.results).await;
        report.attach_articles_to_raw();
    }

    // ---- Output ----
    let prefix = artifact_prefix(request.mode_name(), &request.base_query, request.start, request.end);
    let written = outputs::write_all(&args.output_dir, &prefix, &report).await?;
    for path in &written {
        info!(path = %path.display(), "Wrote artifact");
    }

    println!(
        "Found {} unique links from {} total results ({} of {} shards failed)",
        report.results.len(),
        report.raw.len(),
        report.failures.len(),
        report.plan.shard_count
    );

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Pace `source` with the configured delay and run every shard of `plan`.
async fn search<S: PageSource>(source: S, config: &Config, request: &SearchRequest, plan: &QuotaPlan) -> RunReport {
    let pacer = FixedInterval::new(config.page_delay(), config.page_jitter());
    let paced = Paced::new(source, pacer);
    execute(&paced, request, plan).await
}
