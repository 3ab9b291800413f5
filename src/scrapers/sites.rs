//! Per-portal selectors for Indonesian news sites.
//!
//! Layouts change without notice; a profile that stops matching simply
//! declines and the chain moves on to the generic strategies.

use crate::models::ArticleDetails;
use crate::scrapers::extractors::{
    first_text, joined_text, meta_author, meta_published, ArticleExtractor, ExtractFailure,
};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

struct SiteProfile {
    /// Matches the host itself and any subdomain of it.
    domain: &'static str,
    title: &'static str,
    body: &'static str,
}

const PROFILES: &[SiteProfile] = &[
    SiteProfile {
        domain: "detik.com",
        title: "h1.detail__title",
        body: ".detail__body-text p",
    },
    SiteProfile {
        domain: "kompas.com",
        title: "h1.read__title",
        body: ".read__content p",
    },
    SiteProfile {
        domain: "sindonews.com",
        title: "h1",
        body: "#detail-desc, .detail-desc",
    },
    SiteProfile {
        domain: "liputan6.com",
        title: "h1.read-page--header--title",
        body: ".article-content-body__item-content p",
    },
    SiteProfile {
        domain: "cnnindonesia.com",
        title: "h1",
        body: ".detail-text p",
    },
    SiteProfile {
        domain: "tempo.co",
        title: "h1",
        body: "#isi p, .detail-konten p",
    },
    SiteProfile {
        domain: "tribunnews.com",
        title: "h1#arttitle",
        body: ".side-article.txt-article p",
    },
    SiteProfile {
        domain: "okezone.com",
        title: "h1",
        body: "#contentx p",
    },
];

struct CompiledProfile {
    domain: &'static str,
    title: Selector,
    body: Selector,
}

static COMPILED: Lazy<Vec<CompiledProfile>> = Lazy::new(|| {
    PROFILES
        .iter()
        .map(|p| CompiledProfile {
            domain: p.domain,
            title: Selector::parse(p.title).expect("static selector"),
            body: Selector::parse(p.body).expect("static selector"),
        })
        .collect()
});

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.strip_suffix(domain).is_some_and(|rest| rest.ends_with('.'))
}

/// Domains with a dedicated profile.
pub fn supported_domains() -> Vec<&'static str> {
    PROFILES.iter().map(|p| p.domain).collect()
}

/// Selector profile keyed by the article's host.
#[derive(Debug, Default)]
pub struct SiteSelectorExtractor;

impl ArticleExtractor for SiteSelectorExtractor {
    fn name(&self) -> &'static str {
        "site"
    }

    fn try_extract(&self, url: &Url, page: &Html) -> Result<ArticleDetails, ExtractFailure> {
        let host = url.host_str().unwrap_or_default();
        let profile = COMPILED
            .iter()
            .find(|p| host_matches(host, p.domain))
            .ok_or(ExtractFailure::NoMatch(self.name()))?;

        let text = joined_text(page, &profile.body);
        if text.is_empty() {
            return Err(ExtractFailure::EmptyBody(self.name()));
        }
        Ok(ArticleDetails {
            title: first_text(page, &profile.title).unwrap_or_default(),
            text,
            author: meta_author(page),
            published: meta_published(page),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_profiles_compile() {
        assert_eq!(COMPILED.len(), PROFILES.len());
    }

    #[test]
    fn test_host_matching() {
        assert!(host_matches("news.detik.com", "detik.com"));
        assert!(host_matches("detik.com", "detik.com"));
        assert!(!host_matches("notdetik.com", "detik.com"));
        assert!(supported_domains().contains(&"kompas.com"));
    }

    #[test]
    fn test_detik_profile() {
        let html = r#"<html><head><meta name="author" content="Tim detikcom"></head><body>
            <h1 class="detail__title"> Gempa  Cianjur </h1>
            <div class="detail__body-text"><p>Gempa terjadi pagi ini.</p><p>Warga mengungsi.</p></div>
            <p>Baca juga</p>
        </body></html>"#;
        let page = Html::parse_document(html);
        let url = Url::parse("https://news.detik.com/berita/d-1/gempa").unwrap();
        let details = SiteSelectorExtractor.try_extract(&url, &page).unwrap();
        assert_eq!(details.title, "Gempa Cianjur");
        assert_eq!(details.text, "Gempa terjadi pagi ini. Warga mengungsi.");
        assert_eq!(details.author, "Tim detikcom");
    }

    #[test]
    fn test_unknown_site_declines() {
        let page = Html::parse_document("<p>x</p>");
        let url = Url::parse("https://example.org/a").unwrap();
        assert_eq!(
            SiteSelectorExtractor.try_extract(&url, &page).unwrap_err(),
            ExtractFailure::NoMatch("site")
        );
    }

    #[test]
    fn test_known_site_with_changed_layout() {
        let page = Html::parse_document("<html><body><p>x</p></body></html>");
        let url = Url::parse("https://www.kompas.com/read/1").unwrap();
        assert_eq!(
            SiteSelectorExtractor.try_extract(&url, &page).unwrap_err(),
            ExtractFailure::EmptyBody("site")
        );
    }
}
