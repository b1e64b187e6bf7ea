//! Workbook serialization for the merged KPI table and its commentary.

use anyhow::Result;
use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use crate::table::{Cell, Table};

pub const KPI_SHEET: &str = "KPI Report";
pub const COMMENTS_SHEET: &str = "Improvement Comments";

/// Build the two-sheet report workbook and return it as an in-memory xlsx
/// buffer. Sheet 1 is the merged table, header row then one row per record;
/// sheet 2 is one commentary line per row, no header. Nulls stay blank,
/// dates are real date cells.
pub fn write_report(merged: &Table, commentary: &[String]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let bold = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let sheet = workbook.add_worksheet();
    sheet.set_name(KPI_SHEET)?;

    for (col, header) in merged.headers.iter().enumerate() {
        sheet.write_with_format(0, col as u16, header, &bold)?;
    }

    for (idx, row) in merged.rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Number(n) => {
                    sheet.write(r, c, *n)?;
                }
                Cell::Text(s) => {
                    sheet.write(r, c, s)?;
                }
                Cell::Bool(b) => {
                    sheet.write(r, c, *b)?;
                }
                Cell::Date(d) => {
                    sheet.write_with_format(r, c, *d, &date_format)?;
                }
            }
        }
    }
    sheet.set_column_width(0, 12)?;

    let comments = workbook.add_worksheet();
    comments.set_name(COMMENTS_SHEET)?;
    for (idx, line) in commentary.iter().enumerate() {
        comments.write(idx as u32, 0, line)?;
    }
    comments.set_column_width(0, 100)?;

    let buf = workbook.save_to_buffer()?;
    debug!(bytes = buf.len(), "workbook serialized");
    Ok(buf)
}
