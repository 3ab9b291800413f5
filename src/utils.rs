//! Text helpers and file system checks.
//!
//! - Whitespace cleanup for titles and snippets
//! - String truncation for logs and error bodies
//! - Filename prefixes for exported artifacts
//! - Output directory validation

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::Result;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("static regex"));

/// Collapse runs of whitespace to a single space and trim.
pub fn clean_text(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}

/// Truncate a string to `max` characters for logging.
///
/// Longer strings get `"…(+N bytes)"` appended, where N is the number of
/// bytes dropped. Cuts on character boundaries.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Filename prefix for a run's artifacts: `google_cse_{mode}_{slug}`.
///
/// The slug is `{query}_{start}_{end}` lowercased with every run of
/// non-word characters replaced by `_`.
pub fn artifact_prefix(mode: &str, base_query: &str, start: NaiveDate, end: NaiveDate) -> String {
    let raw = format!("{}_{}_{}", base_query, start, end).to_lowercase();
    format!("google_cse_{}_{}", mode, NON_WORD.replace_all(&raw, "_"))
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let s = "é".repeat(10);
        assert_eq!(truncate_for_log(&s, 3), "ééé…(+14 bytes)");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Banjir \n\t di   Jakarta "), "Banjir di Jakarta");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_artifact_prefix() {
        let start: NaiveDate = "2024-01-01".parse().unwrap();
        let end: NaiveDate = "2024-03-31".parse().unwrap();
        assert_eq!(
            artifact_prefix("auto", "AI site:kompas.com", start, end),
            "google_cse_auto_ai_site_kompas_com_2024_01_01_2024_03_31"
        );
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__probe_write__").exists());
    }
}
