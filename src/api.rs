//! Upstream search capability and request pacing.
//!
//! The paginated fetcher talks to the search backend through the
//! [`PageSource`] trait, so the real HTTP clients and test doubles are
//! interchangeable.
//!
//! # Pacing
//!
//! Requests are sequential and spaced by a [`Pacer`]. [`Paced`] is a
//! decorator that waits on its pacer before every call of the wrapped
//! source:
//! - [`FixedInterval`]: at least `interval + jitter` between consecutive calls
//! - [`NoPacing`]: never waits
//!
//! Pacing is a rate limit, not a retry policy. Failed pages are not retried.

use crate::error::Result;
use crate::models::SearchResult;
use rand::{rng, Rng};
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, instrument, warn};

/// One page of upstream search results.
pub trait PageSource {
    /// Fetch up to `page_size` hits for `query`, starting at 1-based `offset`.
    ///
    /// Positions on the returned hits start at `offset`. An empty page means
    /// the upstream has nothing more for this query.
    async fn fetch_page(&self, query: &str, offset: usize, page_size: usize) -> Result<Vec<SearchResult>>;
}

impl<T: PageSource> PageSource for &T {
    async fn fetch_page(&self, query: &str, offset: usize, page_size: usize) -> Result<Vec<SearchResult>> {
        (**self).fetch_page(query, offset, page_size).await
    }
}

/// Rate-limiting policy applied before each upstream request.
pub trait Pacer {
    async fn pace(&self);
}

impl<T: Pacer> Pacer for &T {
    async fn pace(&self) {
        (**self).pace().await
    }
}

/// Never waits. For tests and for backends without rate limits.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacing;

impl Pacer for NoPacing {
    async fn pace(&self) {}
}

/// Keeps consecutive requests at least `interval` (plus up to `jitter`) apart.
///
/// The first request goes out immediately.
pub struct FixedInterval {
    interval: Duration,
    jitter: Duration,
    last: Mutex<Option<Instant>>,
}

impl FixedInterval {
    pub fn new(interval: Duration, jitter: Duration) -> Self {
        Self {
            interval,
            jitter,
            last: Mutex::new(None),
        }
    }

    fn next_gap(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.interval;
        }
        self.interval + Duration::from_millis(rng().random_range(0..=jitter_ms))
    }
}

impl fmt::Debug for FixedInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedInterval")
            .field("interval", &self.interval)
            .field("jitter", &self.jitter)
            .finish()
    }
}

impl Pacer for FixedInterval {
    async fn pace(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let due = previous + self.next_gap();
            if due > Instant::now() {
                debug!(wait_ms = (due - Instant::now()).as_millis() as u64, "Pacing upstream request");
                sleep_until(due).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Decorator that paces every call of an inner [`PageSource`].
pub struct Paced<S, P> {
    inner: S,
    pacer: P,
}

impl<S, P> Paced<S, P>
where
    S: PageSource,
    P: Pacer,
{
    pub fn new(inner: S, pacer: P) -> Self {
        Self { inner, pacer }
    }
}

impl<S, P: fmt::Debug> fmt::Debug for Paced<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paced").field("pacer", &self.pacer).finish()
    }
}

impl<S, P> PageSource for Paced<S, P>
where
    S: PageSource,
    P: Pacer,
{
    #[instrument(level = "debug", skip_all, fields(offset = offset, page_size = page_size))]
    async fn fetch_page(&self, query: &str, offset: usize, page_size: usize) -> Result<Vec<SearchResult>> {
        self.pacer.pace().await;
        let t0 = std::time::Instant::now();
        let res = self.inner.fetch_page(query, offset, page_size).await;
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        match &res {
            Ok(hits) => debug!(elapsed_ms, returned = hits.len(), "Page fetched"),
            Err(e) => warn!(elapsed_ms, error = %e, "Page fetch failed"),
        }
        res
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted page sources shared by tests across modules.

    use super::*;
    use crate::error::SearchError;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves `available` synthetic hits per query; fails for queries containing `fail_on`.
    pub struct ScriptedSource {
        pub available: usize,
        pub fail_on: Option<String>,
        pub calls: StdMutex<Vec<(String, usize, usize)>>,
    }

    impl ScriptedSource {
        pub fn new(available: usize) -> Self {
            Self {
                available,
                fail_on: None,
                calls: StdMutex::new(Vec::new()),
            }
        }

        pub fn failing_on(mut self, needle: &str) -> Self {
            self.fail_on = Some(needle.to_string());
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl PageSource for ScriptedSource {
        async fn fetch_page(&self, query: &str, offset: usize, page_size: usize) -> Result<Vec<SearchResult>> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), offset, page_size));
            if self.fail_on.as_deref().is_some_and(|needle| query.contains(needle)) {
                return Err(SearchError::Upstream {
                    status: 429,
                    body: "rateLimitExceeded".to_string(),
                });
            }
            let first = offset.max(1);
            let last = (first + page_size).min(self.available + 1);
            Ok((first..last)
                .map(|pos| {
                    SearchResult::new(
                        format!("hit {pos}"),
                        format!("https://example.com/{}/{pos}", query.replace(' ', "_")),
                        "",
                        pos,
                    )
                })
                .collect())
        }
    }

    #[derive(Default)]
    pub struct CountingPacer {
        pub count: AtomicUsize,
    }

    impl Pacer for CountingPacer {
        async fn pace(&self) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{CountingPacer, ScriptedSource};
    use super::*;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_paced_waits_before_each_call() {
        let pacer = CountingPacer::default();
        let source = ScriptedSource::new(30);
        let paced = Paced::new(&source, &pacer);

        paced.fetch_page("q", 1, 10).await.unwrap();
        paced.fetch_page("q", 11, 10).await.unwrap();

        assert_eq!(pacer.count.load(Ordering::SeqCst), 2);
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_interval_spaces_calls() {
        let pacer = FixedInterval::new(Duration::from_millis(30), Duration::ZERO);
        let t0 = Instant::now();
        pacer.pace().await;
        assert!(t0.elapsed() < Duration::from_millis(30));
        pacer.pace().await;
        assert!(t0.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_scripted_source_exhausts() {
        let source = ScriptedSource::new(12);
        let page = source.fetch_page("q", 11, 10).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].position, 11);
        assert!(source.fetch_page("q", 13, 10).await.unwrap().is_empty());
    }
}
