//! CSV export of merged results.

use crate::error::Result;
use crate::models::SearchResult;
use crate::outputs::{row_values, COLUMNS};
use std::path::{Path, PathBuf};
use tracing::info;

/// Write `results` with a header row to `path`.
pub fn write_csv(results: &[SearchResult], path: &Path) -> Result<PathBuf> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(COLUMNS)?;
    for hit in results {
        writer.write_record(row_values(hit))?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = results.len(), "Wrote CSV");
    Ok(path.to_path_buf())
}
