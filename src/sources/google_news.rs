//! Google News RSS search backend.
//!
//! `news.google.com/rss/search` answers a query with a single RSS 2.0 feed of
//! up to ~100 items and has no paging parameters. The feed for the most
//! recent query is cached and pages are served from it, so a paginated fetch
//! of one shard costs one HTTP request. Offsets past the end of the feed
//! yield an empty page.

use crate::api::PageSource;
use crate::error::{Result, SearchError};
use crate::models::{Locale, SearchResult};
use crate::utils::{clean_text, truncate_for_log};
use scraper::Html;
use serde::Deserialize;
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Deserialize)]
struct RssDocument {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
}

/// Parse a Google News RSS feed into hits positioned from 1.
pub fn parse_feed(xml: &str) -> Result<Vec<SearchResult>> {
    let doc: RssDocument =
        quick_xml::de::from_str(xml).map_err(|e| SearchError::MalformedResponse(e.to_string()))?;

    let hits = doc
        .channel
        .items
        .into_iter()
        .filter(|item| !item.link.trim().is_empty())
        .enumerate()
        .map(|(i, item)| {
            let snippet = Html::parse_fragment(&item.description)
                .root_element()
                .text()
                .collect::<Vec<_>>()
                .join(" ");
            SearchResult::new(clean_text(&item.title), item.link.trim(), clean_text(&snippet), i + 1)
        })
        .collect();
    Ok(hits)
}

/// Build the feed URL for `query`. `ceid` is `GL:hl`, e.g. `ID:id`.
pub fn feed_url(endpoint: &str, query: &str, locale: &Locale) -> String {
    let gl = locale.gl.to_uppercase();
    format!(
        "{}?q={}&hl={}&gl={}&ceid={}:{}",
        endpoint,
        urlencoding::encode(query),
        urlencoding::encode(&locale.hl),
        urlencoding::encode(&gl),
        urlencoding::encode(&gl),
        urlencoding::encode(&locale.hl)
    )
}

/// Google News search client.
#[derive(Debug)]
pub struct GoogleNewsClient {
    http: reqwest::Client,
    endpoint: String,
    locale: Locale,
    cache: Mutex<Option<(String, Vec<SearchResult>)>>,
}

impl GoogleNewsClient {
    pub fn new(http: reqwest::Client, endpoint: &str, locale: Locale) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('?').to_string(),
            locale,
            cache: Mutex::new(None),
        }
    }

    fn cached(&self, query: &str) -> Option<Vec<SearchResult>> {
        let guard = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .filter(|(q, _)| q == query)
            .map(|(_, items)| items.clone())
    }

    #[instrument(level = "info", skip_all, fields(%query))]
    async fn fetch_feed(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = feed_url(&self.endpoint, query, &self.locale);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let body = truncate_for_log(&body, 200);
            warn!(status = status.as_u16(), %body, "Google News request rejected");
            return Err(SearchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let hits = parse_feed(&body)?;
        info!(count = hits.len(), "Fetched Google News feed");
        Ok(hits)
    }
}

impl PageSource for GoogleNewsClient {
    async fn fetch_page(&self, query: &str, offset: usize, page_size: usize) -> Result<Vec<SearchResult>> {
        let feed = match self.cached(query) {
            Some(feed) => feed,
            None => {
                let feed = self.fetch_feed(query).await?;
                *self.cache.lock().unwrap_or_else(|e| e.into_inner()) = Some((query.to_string(), feed.clone()));
                feed
            }
        };

        let page: Vec<SearchResult> = feed
            .into_iter()
            .skip(offset.max(1) - 1)
            .take(page_size)
            .collect();
        debug!(offset, returned = page.len(), "Served Google News page");
        Ok(page)
    }
}
