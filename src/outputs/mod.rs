//! Export of run results.
//!
//! # Submodules
//!
//! - [`csv`]: merged results as `{prefix}.csv`
//! - [`excel`]: merged results as `{prefix}.xlsx`, one sheet named `Results`
//! - [`json`]: the raw, unmerged hit list as `{prefix}.json` for debugging
//!
//! CSV and Excel share the column layout in [`COLUMNS`].

pub mod csv;
pub mod excel;
pub mod json;

use crate::error::Result;
use crate::run::RunReport;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::models::SearchResult;

/// Column order of the tabular exports.
pub const COLUMNS: [&str; 11] = [
    "title",
    "link",
    "snippet",
    "position",
    "shard_label",
    "shard_start",
    "shard_end",
    "article_title",
    "article_text",
    "article_author",
    "article_published",
];

/// One result flattened into [`COLUMNS`] order. Missing values are empty strings.
pub fn row_values(hit: &SearchResult) -> [String; 11] {
    let article = hit.article.clone().unwrap_or_default();
    [
        hit.title.clone(),
        hit.link.clone(),
        hit.snippet.clone(),
        hit.position.to_string(),
        hit.shard_label.clone().unwrap_or_default(),
        hit.shard_start.map(|d| d.to_string()).unwrap_or_default(),
        hit.shard_end.map(|d| d.to_string()).unwrap_or_default(),
        article.title,
        article.text,
        article.author,
        article.published,
    ]
}

/// Write every artifact for `report` into `dir`. Returns the written paths.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), %prefix))]
pub async fn write_all(dir: &Path, prefix: &str, report: &RunReport) -> Result<Vec<PathBuf>> {
    let results = report.results.as_slice();
    let paths = vec![
        csv::write_csv(results, &dir.join(format!("{prefix}.csv")))?,
        excel::write_excel(results, &dir.join(format!("{prefix}.xlsx")))?,
        json::write_raw(&report.raw, &dir.join(format!("{prefix}.json"))).await?,
    ];
    info!(count = paths.len(), "Wrote artifacts");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleDetails, DateShard};

    #[test]
    fn test_row_values_with_provenance_and_article() {
        let shard = DateShard {
            start: "2024-01-01".parse().unwrap(),
            end: "2024-01-31".parse().unwrap(),
            label: "2024-01".to_string(),
        };
        let mut hit = SearchResult::new("t", "https://l", "s", 4).with_shard(&shard);
        hit.article = Some(ArticleDetails {
            title: "at".to_string(),
            text: "body".to_string(),
            author: "au".to_string(),
            published: "2024-01-02".to_string(),
        });

        let row = row_values(&hit);
        assert_eq!(row[3], "4");
        assert_eq!(row[4], "2024-01");
        assert_eq!(row[5], "2024-01-01");
        assert_eq!(row[6], "2024-01-31");
        assert_eq!(row[8], "body");
    }

    #[test]
    fn test_row_values_without_optional_fields() {
        let row = row_values(&SearchResult::new("t", "https://l", "s", 1));
        assert!(row[4..].iter().all(|v| v.is_empty()));
    }
}
