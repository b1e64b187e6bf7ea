// src/process/mod.rs
pub mod commentary;
pub mod dates;
pub mod kpi;
pub mod merge;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::config::ReportConfig;
use crate::process::commentary::build_commentary;
use crate::process::kpi::{append_kpi_columns, kpi_means};
use crate::process::merge::merge_on_date;
use crate::report::write_report;
use crate::schema::resolve_kpi_inputs;
use crate::table::Table;

/// Run the whole pipeline: outer-join the inputs on date, derive the four
/// KPI columns, compare their means against the benchmarks, and serialize
/// the two-sheet report. Returns the workbook as an in-memory buffer.
///
/// Fails with a downcastable [`crate::schema::SchemaError`] when a mapped
/// column cannot be resolved; individual bad values degrade to null cells
/// in the output instead.
#[instrument(
    level = "info",
    skip(store, ads, config),
    fields(store_rows = store.rows.len(), ad_tables = ads.len())
)]
pub fn process(store: Table, ads: Vec<Table>, config: &ReportConfig) -> Result<Vec<u8>> {
    let mut merged = merge_on_date(store, ads, &config.schema)?;
    let inputs = resolve_kpi_inputs(&merged, &config.schema)?;

    let kpi_start = append_kpi_columns(&mut merged, inputs);
    let means = kpi_means(&merged, kpi_start);
    info!(?means, "kpi means computed");

    let commentary = build_commentary(&means, &config.benchmarks);
    write_report(&merged, &commentary).context("serializing report workbook")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaError;
    use crate::table::Cell;
    use anyhow::Result;
    use calamine::{DataType, Reader, Xlsx};
    use chrono::NaiveDate;
    use std::io::Cursor;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,adreport::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn table(headers: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        let mut t = Table::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            t.push_row(row);
        }
        t
    }

    fn num(n: f64) -> Cell {
        Cell::Number(n)
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn end_to_end_scenario() -> Result<()> {
        init_test_logging();

        let store = table(
            &["Date", "Visits"],
            vec![vec![text("2024-01-01"), num(10.0)]],
        );
        let ads = vec![table(
            &["Date", "Cost", "CV", "Revenue"],
            vec![vec![text("2024-01-01"), num(1000.0), num(2.0), num(5000.0)]],
        )];

        let buf = process(store, ads, &ReportConfig::default())?;

        let mut workbook = Xlsx::new(Cursor::new(buf))?;
        assert_eq!(
            workbook.sheet_names(),
            vec!["KPI Report", "Improvement Comments"]
        );

        let range = workbook.worksheet_range("KPI Report")?;
        let mut rows = range.rows();

        let headers: Vec<String> = rows
            .next()
            .unwrap()
            .iter()
            .map(|c| c.as_string().unwrap_or_default())
            .collect();
        assert_eq!(
            headers,
            vec!["Date", "Cost", "CV", "Revenue", "Visits", "ROAS", "CPA", "LTV", "ROI"]
        );

        let row = rows.next().unwrap();
        assert_eq!(row[0].as_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(row[1].get_float(), Some(1000.0));
        assert_eq!(row[4].get_float(), Some(10.0));
        assert_eq!(row[5].get_float(), Some(5.0)); // ROAS
        assert_eq!(row[6].get_float(), Some(500.0)); // CPA
        assert_eq!(row[7].get_float(), Some(2500.0)); // LTV
        assert_eq!(row[8].get_float(), Some(4.0)); // ROI
        assert!(rows.next().is_none());

        let comments = workbook.worksheet_range("Improvement Comments")?;
        let lines: Vec<String> = comments
            .rows()
            .map(|r| r[0].as_string().unwrap_or_default())
            .collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ROAS"));
        assert!(lines[1].starts_with("CPA"));
        assert!(lines[2].starts_with("LTV"));
        assert!(lines[3].starts_with("ROI"));
        // only LTV (2500 vs 6000) misses its benchmark in this scenario
        assert!(lines[2].contains("low"));
        assert!(lines[0].contains("at or above"));

        Ok(())
    }

    #[test]
    fn missing_store_date_column_aborts_with_schema_error() {
        init_test_logging();

        let store = table(&["Visits"], vec![vec![num(10.0)]]);
        let ads = vec![table(
            &["Date", "Cost", "CV", "Revenue"],
            vec![vec![text("2024-01-01"), num(1.0), num(1.0), num(1.0)]],
        )];

        let err = process(store, ads, &ReportConfig::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::StoreDateColumn { .. })
        ));
    }

    #[test]
    fn missing_kpi_column_aborts_with_schema_error() {
        init_test_logging();

        // no Revenue column anywhere
        let store = table(
            &["Date", "Visits"],
            vec![vec![text("2024-01-01"), num(10.0)]],
        );
        let ads = vec![table(
            &["Date", "Cost", "CV"],
            vec![vec![text("2024-01-01"), num(1.0), num(1.0)]],
        )];

        let err = process(store, ads, &ReportConfig::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::KpiColumn(c)) if c == "Revenue"
        ));
    }

    #[test]
    fn kpi_inputs_may_come_from_the_store_side() -> Result<()> {
        init_test_logging();

        // Revenue lives on the store side; the ad side has Cost and CV
        let store = table(
            &["Date", "Revenue"],
            vec![vec![text("2024-01-01"), num(5000.0)]],
        );
        let ads = vec![table(
            &["Day", "Cost", "CV"],
            vec![vec![text("2024-01-01"), num(1000.0), num(2.0)]],
        )];

        let buf = process(store, ads, &ReportConfig::default())?;

        let mut workbook = Xlsx::new(Cursor::new(buf))?;
        let range = workbook.worksheet_range("KPI Report")?;
        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .unwrap()
            .iter()
            .map(|c| c.as_string().unwrap_or_default())
            .collect();
        assert_eq!(
            headers,
            vec!["Date", "Cost", "CV", "Revenue", "ROAS", "CPA", "LTV", "ROI"]
        );

        let row = rows.next().unwrap();
        assert_eq!(row[4].get_float(), Some(5.0)); // ROAS
        Ok(())
    }
}
