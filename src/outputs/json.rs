//! Raw JSON dump of the unmerged hit list.
//!
//! The dump keeps duplicates, linkless hits and shard provenance exactly as
//! fetched, which makes it the artifact to look at when a merged count looks
//! wrong. After enrichment it also carries the article fields.

use crate::error::Result;
use crate::models::SearchResult;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Serialize `raw` as pretty JSON to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_raw(raw: &[SearchResult], path: &Path) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(raw)?;
    fs::write(path, json).await?;
    info!(count = raw.len(), "Wrote raw JSON");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_raw_keeps_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.json");
        let raw = vec![
            SearchResult::new("a", "https://a", "", 1),
            SearchResult::new("a again", "https://a", "", 2),
        ];

        write_raw(&raw, &path).await.unwrap();

        let back: Vec<SearchResult> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, raw);
    }
}
