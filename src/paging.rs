//! Paginated fetch of a single query, in blocks of at most 10 results.

use crate::api::PageSource;
use crate::error::Result;
use crate::models::SearchResult;
use crate::quota::{MAX_RESULTS_PER_QUERY, PAGE_SIZE};
use tracing::{debug, instrument};

/// Collect up to `total` results for `query`, one page at a time.
///
/// `total` is clamped to `[1, 100]`. Pages are requested sequentially
/// starting at offset 1; the offset advances by the number of hits actually
/// returned. An empty page ends pagination early.
///
/// # Arguments
///
/// * `source` - Backend answering single-page requests
/// * `query` - Full query string, date operators included
/// * `total` - Results wanted for this query
///
/// # Returns
///
/// The hits in fetch order, at most `ceil(total / 10)` calls' worth.
///
/// # Errors
///
/// The first page error is returned as-is and the hits collected so far are
/// dropped.
#[instrument(level = "info", skip_all, fields(%query, total = total))]
pub async fn fetch_paginated<S: PageSource>(source: &S, query: &str, total: usize) -> Result<Vec<SearchResult>> {
    let total = total.clamp(1, MAX_RESULTS_PER_QUERY);
    let mut collected = Vec::with_capacity(total);
    let mut offset = 1usize;
    let mut remaining = total;

    while remaining > 0 {
        let page_size = remaining.min(PAGE_SIZE);
        let page = source.fetch_page(query, offset, page_size).await?;
        if page.is_empty() {
            debug!(offset, "Upstream exhausted");
            break;
        }
        remaining = remaining.saturating_sub(page.len());
        offset += page.len();
        collected.extend(page);
    }

    debug!(collected = collected.len(), "Finished paginated fetch");
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedSource;

    #[tokio::test]
    async fn test_page_calls_match_limit() {
        for limit in [1usize, 9, 10, 11, 50, 99, 100] {
            let source = ScriptedSource::new(1_000);
            let hits = fetch_paginated(&source, "q", limit).await.unwrap();
            assert_eq!(hits.len(), limit);
            assert_eq!(source.call_count(), limit.div_ceil(10), "limit {limit}");
        }
    }

    #[tokio::test]
    async fn test_offsets_and_page_sizes() {
        let source = ScriptedSource::new(1_000);
        fetch_paginated(&source, "q", 25).await.unwrap();
        let calls = source.calls.lock().unwrap().clone();
        let shape: Vec<_> = calls.iter().map(|(_, o, n)| (*o, *n)).collect();
        assert_eq!(shape, vec![(1, 10), (11, 10), (21, 5)]);
    }

    #[tokio::test]
    async fn test_total_is_clamped() {
        let source = ScriptedSource::new(1_000);
        let hits = fetch_paginated(&source, "q", 500).await.unwrap();
        assert_eq!(hits.len(), 100);
        assert_eq!(source.call_count(), 10);

        let source = ScriptedSource::new(1_000);
        let hits = fetch_paginated(&source, "q", 0).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        let source = ScriptedSource::new(15);
        let hits = fetch_paginated(&source, "q", 50).await.unwrap();
        assert_eq!(hits.len(), 15);
        // pages at 1 and 11 return hits; the page at 16 is empty
        assert_eq!(source.call_count(), 3);
        assert_eq!(hits.last().unwrap().position, 15);
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let source = ScriptedSource::new(100).failing_on("q");
        let err = fetch_paginated(&source, "q", 30).await.unwrap_err();
        assert!(matches!(err, crate::error::SearchError::Upstream { status: 429, .. }));
        assert_eq!(source.call_count(), 1);
    }

    /// Serves CSE-shaped pages where the second item of every page has no link.
    struct LinklessItemSource {
        calls: std::sync::Mutex<usize>,
    }

    impl PageSource for LinklessItemSource {
        async fn fetch_page(&self, _query: &str, offset: usize, page_size: usize) -> Result<Vec<SearchResult>> {
            *self.calls.lock().unwrap() += 1;
            let items: Vec<String> = (0..page_size)
                .map(|i| match i {
                    1 => r#"{"title": "no link"}"#.to_string(),
                    _ => format!(r#"{{"title": "t", "link": "https://e/{}"}}"#, offset + i),
                })
                .collect();
            let body = format!(r#"{{"items": [{}]}}"#, items.join(","));
            crate::sources::cse::parse_cse_page(&body, offset)
        }
    }

    #[tokio::test]
    async fn test_linkless_items_do_not_cost_extra_calls() {
        let source = LinklessItemSource {
            calls: std::sync::Mutex::new(0),
        };
        let hits = fetch_paginated(&source, "q", 20).await.unwrap();

        assert_eq!(*source.calls.lock().unwrap(), crate::quota::estimate_calls(1, 20));
        assert_eq!(hits.len(), 20);
        assert_eq!(hits.iter().filter(|h| h.link.is_empty()).count(), 2);
        assert_eq!(crate::aggregate::merge(vec![hits]).len(), 18);
    }
}
