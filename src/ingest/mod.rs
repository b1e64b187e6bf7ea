// src/ingest/mod.rs
use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::process::dates::parse_date_str;
use crate::table::{Cell, Table};

/// Load the store workbook: the first sheet becomes the store table.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_store_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let mut workbook = open_workbook_auto(&path)
        .with_context(|| format!("opening store workbook {:?}", path.as_ref()))?;

    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("store workbook {:?} has no sheets", path.as_ref()))?;
    let range = workbook
        .worksheet_range(&name)
        .with_context(|| format!("reading sheet `{}`", name))?;

    let table = range_to_table(&range)
        .ok_or_else(|| anyhow!("store sheet `{}` is empty", name))?;
    info!(
        sheet = %name,
        rows = table.rows.len(),
        columns = table.width(),
        "loaded store table"
    );
    Ok(table)
}

/// Load the ad workbook: every sheet with data rows becomes one ad table,
/// in workbook order. Header-only and blank sheets are skipped.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_ad_tables<P: AsRef<Path>>(path: P) -> Result<Vec<Table>> {
    let mut workbook = open_workbook_auto(&path)
        .with_context(|| format!("opening ad workbook {:?}", path.as_ref()))?;

    let mut tables = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("reading sheet `{}`", name))?;
        match range_to_table(&range) {
            Some(t) if !t.rows.is_empty() => {
                debug!(sheet = %name, rows = t.rows.len(), columns = t.width(), "loaded ad sheet");
                tables.push(t);
            }
            _ => warn!(sheet = %name, "skipping sheet with no data rows"),
        }
    }

    if tables.is_empty() {
        return Err(anyhow!(
            "ad workbook {:?} has no sheets with data",
            path.as_ref()
        ));
    }
    info!(sheets = tables.len(), "loaded ad tables");
    Ok(tables)
}

/// First row supplies headers, the rest become cell rows. `None` when the
/// sheet has no cells at all.
fn range_to_table(range: &Range<Data>) -> Option<Table> {
    let mut rows = range.rows();
    let header_row = rows.next()?;

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, c)| {
            c.as_string()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("column_{}", i + 1))
        })
        .collect();

    let mut table = Table::new(headers);
    for row in rows {
        table.push_row(row.iter().map(to_cell).collect());
    }
    Some(table)
}

/// Map one calamine cell onto the pipeline's cell model. Unrepresentable
/// values (error cells, durations) become empty, logged, never fatal.
fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => Cell::Date(ndt.date()),
            None => {
                warn!(value = ?dt, "unrepresentable date cell, treating as empty");
                Cell::Empty
            }
        },
        Data::DateTimeIso(s) => match parse_date_str(s) {
            Some(d) => Cell::Date(d),
            None => {
                warn!(value = %s, "unparseable ISO date cell, treating as empty");
                Cell::Empty
            }
        },
        Data::Error(e) => {
            warn!(value = ?e, "error cell, treating as empty");
            Cell::Empty
        }
        Data::DurationIso(s) => {
            warn!(value = %s, "duration cell, treating as empty");
            Cell::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::NaiveDate;
    use rust_xlsxwriter::{Format, Workbook};
    use std::path::PathBuf;
    use tempfile::tempdir;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,adreport::ingest=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn write_store_fixture(dir: &Path) -> Result<PathBuf> {
        let path = dir.join("store.xlsx");
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        let sheet = workbook.add_worksheet();
        sheet.set_name("visits")?;
        sheet.write(0, 0, "Date")?;
        sheet.write(0, 1, "Visits")?;
        sheet.write(0, 2, "Note")?;
        sheet.write_with_format(
            1,
            0,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            &date_format,
        )?;
        sheet.write(1, 1, 10.0)?;
        sheet.write(1, 2, "opening day")?;
        sheet.write_with_format(
            2,
            0,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            &date_format,
        )?;
        sheet.write(2, 1, 20.0)?;

        workbook.save(&path)?;
        Ok(path)
    }

    #[test]
    fn store_round_trips_headers_and_cells() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let path = write_store_fixture(dir.path())?;

        let table = load_store_table(&path)?;

        assert_eq!(table.headers, vec!["Date", "Visits", "Note"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[0][0],
            Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert_eq!(table.rows[0][1], Cell::Number(10.0));
        assert_eq!(table.rows[0][2], Cell::Text("opening day".into()));
        // short second row comes back padded
        assert_eq!(table.rows[1][2], Cell::Empty);
        Ok(())
    }

    #[test]
    fn ad_loader_keeps_sheet_order_and_skips_empty_sheets() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let path = dir.path().join("ads.xlsx");

        let mut workbook = Workbook::new();
        let first = workbook.add_worksheet();
        first.set_name("January")?;
        first.write(0, 0, "Day")?;
        first.write(0, 1, "Cost")?;
        first.write(1, 0, "2024-01-01")?;
        first.write(1, 1, 100.0)?;

        let header_only = workbook.add_worksheet();
        header_only.set_name("empty")?;
        header_only.write(0, 0, "Day")?;

        let second = workbook.add_worksheet();
        second.set_name("February")?;
        second.write(0, 0, "Day")?;
        second.write(0, 1, "Revenue")?;
        second.write(1, 0, "2024-02-01")?;
        second.write(1, 1, 500.0)?;

        workbook.save(&path)?;

        let tables = load_ad_tables(&path)?;

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].headers, vec!["Day", "Cost"]);
        assert_eq!(tables[0].rows[0][1], Cell::Number(100.0));
        assert_eq!(tables[1].headers, vec!["Day", "Revenue"]);
        assert_eq!(tables[1].rows[0][1], Cell::Number(500.0));
        Ok(())
    }

    #[test]
    fn blank_ad_workbook_is_an_error() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let path = dir.path().join("ads.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("nothing here")?;
        workbook.save(&path)?;

        let err = load_ad_tables(&path).unwrap_err();
        assert!(err.to_string().contains("no sheets with data"));
        Ok(())
    }

    #[test]
    fn blank_header_cells_get_positional_names() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let path = dir.path().join("store.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write(0, 0, "Date")?;
        // header cell at column 1 left blank
        sheet.write(0, 2, "Visits")?;
        sheet.write(1, 0, "2024-01-01")?;
        sheet.write(1, 1, 5.0)?;
        sheet.write(1, 2, 10.0)?;
        workbook.save(&path)?;

        let table = load_store_table(&path)?;
        assert_eq!(table.headers, vec!["Date", "column_2", "Visits"]);
        Ok(())
    }
}
