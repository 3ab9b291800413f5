//! Google Custom Search JSON API client.
//!
//! Each request returns at most 10 items (`num` in `1..=10`) starting at
//! 1-based `start`. Only `title`, `link` and `snippet` are read from the
//! response; items without a link are dropped since the link is the result's
//! identity.

use crate::api::PageSource;
use crate::error::{Result, SearchError};
use crate::models::{Locale, SearchResult};
use crate::quota::PAGE_SIZE;
use crate::utils::{clean_text, truncate_for_log};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, instrument, warn};
use url::Url;

/// Maximum characters of an error body kept in [`SearchError::Upstream`].
const ERROR_BODY_LIMIT: usize = 200;

/// API key and search engine id. Both are required.
#[derive(Clone)]
pub struct CseCredentials {
    api_key: String,
    cx: String,
}

impl CseCredentials {
    /// Reject missing or blank credentials before any request is made.
    pub fn new(api_key: Option<String>, cx: Option<String>) -> Result<Self> {
        let api_key = api_key.map(|k| k.trim().to_string()).unwrap_or_default();
        let cx = cx.map(|c| c.trim().to_string()).unwrap_or_default();
        if api_key.is_empty() || cx.is_empty() {
            return Err(SearchError::input("both a CSE API key and a search engine id (cx) are required"));
        }
        Ok(Self { api_key, cx })
    }
}

impl fmt::Debug for CseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CseCredentials")
            .field("api_key", &"<redacted>")
            .field("cx", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    #[serde(default)]
    title: String,
    link: Option<String>,
    #[serde(default)]
    snippet: String,
}

/// Turn a CSE response body into hits positioned from `start`.
///
/// Items without a link are kept with an empty `link` so the page length
/// matches what the API returned; [`crate::aggregate::merge`] drops them.
pub fn parse_cse_page(body: &str, start: usize) -> Result<Vec<SearchResult>> {
    let response: CseResponse =
        serde_json::from_str(body).map_err(|e| SearchError::MalformedResponse(e.to_string()))?;

    let hits = response
        .items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            SearchResult::new(
                clean_text(&item.title),
                item.link.unwrap_or_default().trim(),
                clean_text(&item.snippet),
                start + i,
            )
        })
        .collect();
    Ok(hits)
}

/// Client for `https://www.googleapis.com/customsearch/v1`.
///
/// Transport errors are stripped of their URL since it carries the API key.
#[derive(Debug)]
pub struct CseClient {
    http: reqwest::Client,
    endpoint: Url,
    credentials: CseCredentials,
    locale: Locale,
}

impl CseClient {
    /// Build a client for one search engine.
    ///
    /// # Arguments
    ///
    /// * `http` - Shared client, already carrying timeout and user agent
    /// * `endpoint` - API base URL, normally `Config::cse_endpoint`
    /// * `credentials` - API key and engine id
    /// * `locale` - `gl`/`hl` sent with every request
    ///
    /// # Returns
    ///
    /// The client, or [`SearchError::Url`] when `endpoint` does not parse.
    pub fn new(http: reqwest::Client, endpoint: &str, credentials: CseCredentials, locale: Locale) -> Result<Self> {
        Ok(Self {
            http,
            endpoint: Url::parse(endpoint)?,
            credentials,
            locale,
        })
    }
}

impl PageSource for CseClient {
    #[instrument(level = "debug", skip_all, fields(offset = offset, page_size = page_size))]
    async fn fetch_page(&self, query: &str, offset: usize, page_size: usize) -> Result<Vec<SearchResult>> {
        let num = page_size.clamp(1, PAGE_SIZE).to_string();
        let start = offset.max(1);
        let start_param = start.to_string();

        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[
                ("key", self.credentials.api_key.as_str()),
                ("cx", self.credentials.cx.as_str()),
                ("q", query),
                ("num", num.as_str()),
                ("start", start_param.as_str()),
                ("gl", self.locale.gl.as_str()),
                ("hl", self.locale.hl.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Http(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(e.without_url()))?;
        if !status.is_success() {
            let body = truncate_for_log(&body, ERROR_BODY_LIMIT);
            warn!(status = status.as_u16(), %body, "CSE request rejected");
            return Err(SearchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let hits = parse_cse_page(&body, start)?;
        debug!(returned = hits.len(), "Parsed CSE page");
        Ok(hits)
    }
}
