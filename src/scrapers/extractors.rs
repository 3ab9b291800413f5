//! Article extraction strategies.
//!
//! An [`ExtractorChain`] parses the page once and tries each
//! [`ArticleExtractor`] in order until one succeeds. Every strategy reports a
//! typed [`ExtractFailure`] when it cannot handle the page.

use crate::models::ArticleDetails;
use crate::scrapers::sites::SiteSelectorExtractor;
use crate::utils::clean_text;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Why an article could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractFailure {
    #[error("{0}: page layout not recognised")]
    NoMatch(&'static str),

    #[error("{0}: matched layout but the body is empty")]
    EmptyBody(&'static str),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// One way of pulling article fields out of a parsed page.
pub trait ArticleExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_extract(&self, url: &Url, page: &Html) -> Result<ArticleDetails, ExtractFailure>;
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static H1: Lazy<Selector> = Lazy::new(|| selector("h1"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));
static ARTICLE_PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("article p"));
static OG_TITLE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:title"]"#));
static META_AUTHOR: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        r#"meta[name="author"]"#,
        r#"meta[property="article:author"]"#,
        r#"meta[name="content_author"]"#,
    ]
    .into_iter()
    .map(selector)
    .collect()
});
static META_PUBLISHED: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        r#"meta[property="article:published_time"]"#,
        r#"meta[name="publishdate"]"#,
        r#"meta[name="pubdate"]"#,
        r#"meta[itemprop="datePublished"]"#,
        r#"meta[name="content_PublishedDate"]"#,
    ]
    .into_iter()
    .map(selector)
    .collect()
});

/// Cleaned text of the first element matching `sel`.
pub(crate) fn first_text(page: &Html, sel: &Selector) -> Option<String> {
    page.select(sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

/// Cleaned, space-joined text of every element matching `sel`.
pub(crate) fn joined_text(page: &Html, sel: &Selector) -> String {
    let parts: Vec<String> = page
        .select(sel)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();
    parts.join(" ")
}

fn element_text(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<Vec<_>>().join(" "))
}

fn meta_content(page: &Html, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        page.select(sel)
            .filter_map(|el| el.value().attr("content"))
            .map(clean_text)
            .find(|c| !c.is_empty())
    })
}

/// Author from the usual meta tags.
pub(crate) fn meta_author(page: &Html) -> String {
    meta_content(page, &META_AUTHOR).unwrap_or_default()
}

/// Publication timestamp from the usual meta tags, as published.
pub(crate) fn meta_published(page: &Html) -> String {
    meta_content(page, &META_PUBLISHED).unwrap_or_default()
}

fn og_title(page: &Html) -> Option<String> {
    meta_content(page, std::slice::from_ref(&*OG_TITLE))
}

/// Open Graph / article meta tags plus paragraphs inside `<article>`.
#[derive(Debug, Default)]
pub struct MetadataExtractor;

impl ArticleExtractor for MetadataExtractor {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn try_extract(&self, _url: &Url, page: &Html) -> Result<ArticleDetails, ExtractFailure> {
        if page.select(&ARTICLE_PARAGRAPH).next().is_none() {
            return Err(ExtractFailure::NoMatch(self.name()));
        }
        let text = joined_text(page, &ARTICLE_PARAGRAPH);
        if text.is_empty() {
            return Err(ExtractFailure::EmptyBody(self.name()));
        }
        Ok(ArticleDetails {
            title: og_title(page)
                .or_else(|| first_text(page, &H1))
                .unwrap_or_default(),
            text,
            author: meta_author(page),
            published: meta_published(page),
        })
    }
}

/// Last resort: the `<title>` and every `<p>` on the page.
#[derive(Debug, Default)]
pub struct ParagraphExtractor;

impl ArticleExtractor for ParagraphExtractor {
    fn name(&self) -> &'static str {
        "paragraphs"
    }

    fn try_extract(&self, _url: &Url, page: &Html) -> Result<ArticleDetails, ExtractFailure> {
        let text = joined_text(page, &PARAGRAPH);
        if text.is_empty() {
            return Err(ExtractFailure::EmptyBody(self.name()));
        }
        Ok(ArticleDetails {
            title: first_text(page, &TITLE).unwrap_or_default(),
            text,
            author: String::new(),
            published: String::new(),
        })
    }
}

/// Ordered list of strategies; the first success wins.
pub struct ExtractorChain {
    strategies: Vec<Box<dyn ArticleExtractor>>,
}

impl ExtractorChain {
    pub fn new(strategies: Vec<Box<dyn ArticleExtractor>>) -> Self {
        Self { strategies }
    }

    /// Per-site selectors, then metadata, then bare paragraphs.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(SiteSelectorExtractor),
            Box::new(MetadataExtractor),
            Box::new(ParagraphExtractor),
        ])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Parse `html` and run the strategies in order.
    ///
    /// Returns the last strategy's failure when none succeeds.
    pub fn extract(&self, url: &Url, html: &str) -> Result<ArticleDetails, ExtractFailure> {
        let page = Html::parse_document(html);
        let mut last = ExtractFailure::NoMatch("chain");
        for strategy in &self.strategies {
            match strategy.try_extract(url, &page) {
                Ok(details) => {
                    debug!(%url, strategy = strategy.name(), "Extracted article");
                    return Ok(details);
                }
                Err(reason) => {
                    debug!(%url, strategy = strategy.name(), %reason, "Strategy declined");
                    last = reason;
                }
            }
        }
        Err(last)
    }
}

impl std::fmt::Debug for ExtractorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorChain")
            .field("strategies", &self.names())
            .finish()
    }
}
