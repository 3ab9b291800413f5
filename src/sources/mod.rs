//! Concrete search backends implementing [`crate::api::PageSource`].
//!
//! | Backend | Module | Method | Notes |
//! |---------|--------|--------|-------|
//! | Google Custom Search | [`cse`] | JSON API | Requires API key and engine id (`cx`); 10 results per call |
//! | Google News | [`google_news`] | RSS search feed | No credentials; one feed per query, paged from cache |
//!
//! Both honour `after:`/`before:` date operators in the query string, so the
//! same shard plan drives either of them.

pub mod cse;
pub mod google_news;

use crate::config::Config;
use crate::error::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which backend a run talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum SourceKind {
    #[default]
    Cse,
    GoogleNews,
}

/// Build the shared HTTP client with the configured user agent and timeout.
pub fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.request_timeout())
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client_from_defaults() {
        assert!(build_http_client(&Config::default()).is_ok());
    }

    #[test]
    fn test_source_kind_default() {
        assert_eq!(SourceKind::default(), SourceKind::Cse);
    }
}
