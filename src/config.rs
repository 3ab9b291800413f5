//! YAML configuration for the crawler.
//!
//! Every field has a default, so a partial file (or none at all) is fine:
//!
//! ```yaml
//! gl: id
//! hl: id
//! page_delay_ms: 250
//! max_workers: 12
//! ```
//!
//! CLI flags take precedence over values from the file. API credentials are
//! never read from this file.

use crate::error::Result;
use crate::models::Locale;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Upper bound on article enrichment workers.
pub const MAX_WORKERS_LIMIT: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gl: String,
    pub hl: String,
    pub cse_endpoint: String,
    pub google_news_endpoint: String,
    /// Timeout for a single search API request.
    pub request_timeout_secs: u64,
    /// Timeout for a single article page request.
    pub article_timeout_secs: u64,
    /// Hard deadline for fetching and extracting one article.
    pub article_deadline_secs: u64,
    pub page_delay_ms: u64,
    pub page_jitter_ms: u64,
    pub max_workers: usize,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gl: "id".to_string(),
            hl: "id".to_string(),
            cse_endpoint: "https://www.googleapis.com/customsearch/v1".to_string(),
            google_news_endpoint: "https://news.google.com/rss/search".to_string(),
            request_timeout_secs: 25,
            article_timeout_secs: 20,
            article_deadline_secs: 60,
            page_delay_ms: 200,
            page_jitter_ms: 50,
            max_workers: 8,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn locale(&self) -> Locale {
        Locale {
            gl: self.gl.clone(),
            hl: self.hl.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn article_timeout(&self) -> Duration {
        Duration::from_secs(self.article_timeout_secs)
    }

    pub fn article_deadline(&self) -> Duration {
        Duration::from_secs(self.article_deadline_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn page_jitter(&self) -> Duration {
        Duration::from_millis(self.page_jitter_ms)
    }

    /// Worker count clamped to `1..=16`.
    pub fn workers(&self) -> usize {
        self.max_workers.clamp(1, MAX_WORKERS_LIMIT)
    }
}

/// Parse a YAML config document.
pub fn parse_config(yaml: &str) -> Result<Config> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load configuration from `path`, or defaults when no path is given.
///
/// A path that is given but unreadable or invalid is an error.
#[instrument(level = "info")]
pub async fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        info!("No config file given; using defaults");
        return Ok(Config::default());
    };
    let yaml = tokio::fs::read_to_string(path).await?;
    let config = parse_config(&yaml)?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = parse_config("gl: us\nmax_workers: 12\n").unwrap();
        assert_eq!(config.gl, "us");
        assert_eq!(config.hl, "id");
        assert_eq!(config.max_workers, 12);
        assert_eq!(config.request_timeout_secs, 25);
    }

    #[test]
    fn test_workers_clamped() {
        let mut config = Config::default();
        config.max_workers = 64;
        assert_eq!(config.workers(), 16);
        config.max_workers = 0;
        assert_eq!(config.workers(), 1);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(parse_config("page_delay_ms: [not a number]").is_err());
    }

    #[tokio::test]
    async fn test_load_config_without_path() {
        let config = load_config(None).await.unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawler.yaml");
        std::fs::write(&path, "hl: en\npage_delay_ms: 250\n").unwrap();

        let config = load_config(Some(&path)).await.unwrap();
        assert_eq!(config.hl, "en");
        assert_eq!(config.page_delay(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_load_config_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(load_config(Some(&missing)).await.is_err());
    }
}
