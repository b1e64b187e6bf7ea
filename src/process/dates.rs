use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::table::{Cell, Table};

const DASH_DATE: &str = "%Y-%m-%d";
const SLASH_DATE: &str = "%Y/%m/%d";
const DASH_TS: &str = "%Y-%m-%d %H:%M:%S";
const SLASH_TS: &str = "%Y/%m/%d %H:%M:%S";
const ISO_TS: &str = "%Y-%m-%dT%H:%M:%S";

/// Calendar-date view of an arbitrary cell. Native date cells pass through;
/// text tries the known formats; integral numbers are read as compact
/// `YYYYMMDD`. Anything else is not a date.
pub fn parse_date_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => parse_date_str(s),
        Cell::Number(n) if n.fract() == 0.0 && *n > 0.0 => {
            parse_compact_digits(&(*n as i64).to_string())
        }
        _ => None,
    }
}

/// Parse `"YYYY-MM-DD"`, `"YYYY/MM/DD"`, either with a trailing time of day,
/// or compact `"YYYYMMDD"`.
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in [DASH_DATE, SLASH_DATE] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in [DASH_TS, SLASH_TS, ISO_TS] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    parse_compact_digits(s)
}

/// `"YYYYMMDD"` → date, via the same slice checks the timestamp parser uses.
fn parse_compact_digits(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Rewrite one column in place: every cell becomes `Date` or, when the value
/// does not read as a date, `Empty`. Blank cells stay silent; anything else
/// that fails is logged and nulled, never fatal.
pub fn normalize_column(table: &mut Table, col: usize) {
    let header = table.headers[col].clone();
    for (row_idx, row) in table.rows.iter_mut().enumerate() {
        let cell = &mut row[col];
        match parse_date_cell(cell) {
            Some(d) => *cell = Cell::Date(d),
            None => {
                if !cell.is_empty() {
                    warn!(column = %header, row = row_idx, value = ?cell, "unparseable date, treating as null");
                }
                *cell = Cell::Empty;
            }
        }
    }
}
