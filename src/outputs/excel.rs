//! Excel export of merged results.

use crate::error::Result;
use crate::models::SearchResult;
use crate::outputs::{row_values, COLUMNS};
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use tracing::info;

const SHEET_NAME: &str = "Results";
const POSITION_COLUMN: usize = 3;

/// Write `results` to a single-sheet workbook at `path`.
///
/// `position` is stored as a number; every other cell is text.
pub fn write_excel(results: &[SearchResult], path: &Path) -> Result<PathBuf> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (i, hit) in results.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, value) in row_values(hit).iter().enumerate() {
            if col == POSITION_COLUMN {
                worksheet.write_number(row, col as u16, hit.position as f64)?;
            } else {
                worksheet.write_string(row, col as u16, value)?;
            }
        }
    }

    workbook.save(path)?;
    info!(path = %path.display(), rows = results.len(), "Wrote Excel workbook");
    Ok(path.to_path_buf())
}
