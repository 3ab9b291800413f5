//! Optional article-body enrichment.
//!
//! After the search phase, each unique link's page can be downloaded and run
//! through an [`ExtractorChain`] to fill in title, text, author and
//! publication time.
//!
//! # Strategies
//!
//! | Order | Strategy | Module | Matches |
//! |-------|----------|--------|---------|
//! | 1 | Site selectors | [`sites`] | Detik, Kompas, SindoNews, Liputan6, CNN Indonesia, Tempo, Tribunnews, Okezone |
//! | 2 | Metadata | [`extractors`] | Pages with `<article>` paragraphs; Open Graph / article meta tags |
//! | 3 | Paragraphs | [`extractors`] | Any page with `<p>` text |
//!
//! # Concurrency
//!
//! Pages are fetched with at most `workers` requests in flight. Output order
//! matches input order. A failed or timed-out article is logged and left
//! without details; it never aborts the batch.

pub mod extractors;
pub mod sites;

use crate::models::{ArticleDetails, ResultSet, SearchResult};
use extractors::{ExtractFailure, ExtractorChain};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Downloads article pages and extracts their content.
#[derive(Debug)]
pub struct ArticleEnricher {
    http: reqwest::Client,
    chain: ExtractorChain,
    workers: usize,
    page_timeout: Duration,
    deadline: Duration,
}

impl ArticleEnricher {
    pub fn new(http: reqwest::Client, workers: usize, page_timeout: Duration, deadline: Duration) -> Self {
        Self {
            http,
            chain: ExtractorChain::standard(),
            workers: workers.max(1),
            page_timeout,
            deadline,
        }
    }

    pub fn with_chain(mut self, chain: ExtractorChain) -> Self {
        self.chain = chain;
        self
    }

    /// Fill `article` on every result whose page could be extracted.
    #[instrument(level = "info", skip_all, fields(count = results.len(), workers = self.workers))]
    pub async fn enrich(&self, results: ResultSet) -> ResultSet {
        let total = results.len();
        let enriched: Vec<SearchResult> = stream::iter(results.into_vec())
            .map(|mut hit| async move {
                match tokio::time::timeout(self.deadline, self.fetch_article(&hit.link)).await {
                    Ok(Ok(details)) => {
                        debug!(link = %hit.link, bytes = details.text.len(), "Article enriched");
                        hit.article = Some(details);
                    }
                    Ok(Err(reason)) => {
                        warn!(link = %hit.link, %reason, "Article extraction failed");
                    }
                    Err(_) => {
                        let reason = ExtractFailure::Timeout(self.deadline);
                        warn!(link = %hit.link, %reason, "Article extraction failed");
                    }
                }
                hit
            })
            .buffered(self.workers)
            .collect()
            .await;

        let extracted = enriched.iter().filter(|hit| hit.article.is_some()).count();
        info!(total, extracted, failed = total - extracted, "Article enrichment finished");
        ResultSet(enriched)
    }

    async fn fetch_article(&self, link: &str) -> Result<ArticleDetails, ExtractFailure> {
        let url = Url::parse(link).map_err(|e| ExtractFailure::Fetch(e.to_string()))?;
        let response = self
            .http
            .get(url.clone())
            .timeout(self.page_timeout)
            .send()
            .await
            .map_err(|e| ExtractFailure::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractFailure::Fetch(format!("status {}", status.as_u16())));
        }
        let html = response
            .text()
            .await
            .map_err(|e| ExtractFailure::Fetch(e.to_string()))?;

        self.chain.extract(&url, &html)
    }
}
