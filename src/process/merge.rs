// src/process/merge.rs
use tracing::{debug, info};

use crate::process::dates::normalize_column;
use crate::schema::{find_date_column, SchemaError, SchemaMapping};
use crate::table::{Cell, Table};

/// Stack every ad table into one. The combined header list is the first-seen
/// order of every column name across the inputs; a source table missing a
/// column contributes nulls there. Row order is input order.
pub fn concat_ad_tables(ads: Vec<Table>) -> Table {
    let mut combined = Table::new(Vec::new());
    for t in &ads {
        for h in &t.headers {
            if combined.column_index(h).is_none() {
                combined.headers.push(h.clone());
            }
        }
    }

    for t in ads {
        // source column position → combined position, by header name
        let targets: Vec<usize> = t
            .headers
            .iter()
            .map(|h| combined.column_index(h).unwrap_or(0))
            .collect();
        for row in t.rows {
            let mut out = vec![Cell::Empty; combined.width()];
            for (i, cell) in row.into_iter().enumerate() {
                out[targets[i]] = cell;
            }
            combined.rows.push(out);
        }
    }

    debug!(
        columns = combined.width(),
        rows = combined.rows.len(),
        "concatenated ad tables"
    );
    combined
}

/// Full outer join of the concatenated ad tables (left) with the store table
/// (right) on their normalized date columns.
///
/// Output layout: one canonical date column first (named after the store's
/// date header), then the ad columns minus the ad date, then the store
/// columns minus the store date. Every input row appears: equal non-null
/// dates combine pairwise, unmatched rows carry nulls for the other side,
/// and a null date never matches anything.
pub fn merge_on_date(
    mut store: Table,
    ads: Vec<Table>,
    mapping: &SchemaMapping,
) -> Result<Table, SchemaError> {
    let mut ad = concat_ad_tables(ads);

    let ad_date = find_date_column(&ad, &mapping.ad_date_candidates).ok_or_else(|| {
        SchemaError::AdDateColumn {
            tried: mapping.ad_date_candidates.clone(),
        }
    })?;
    let store_date =
        find_date_column(&store, &mapping.store_date_candidates).ok_or_else(|| {
            SchemaError::StoreDateColumn {
                tried: mapping.store_date_candidates.clone(),
            }
        })?;

    normalize_column(&mut ad, ad_date);
    normalize_column(&mut store, store_date);

    let mut headers = Vec::with_capacity(ad.width() + store.width() - 1);
    headers.push(store.headers[store_date].clone());
    headers.extend(
        ad.headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != ad_date)
            .map(|(_, h)| h.clone()),
    );
    headers.extend(
        store
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != store_date)
            .map(|(_, h)| h.clone()),
    );

    let ad_width = ad.width() - 1;
    let store_width = store.width() - 1;

    let combine = |date: &Cell, ad_row: Option<&Vec<Cell>>, store_row: Option<&Vec<Cell>>| {
        let mut out = Vec::with_capacity(1 + ad_width + store_width);
        out.push(date.clone());
        match ad_row {
            Some(row) => out.extend(
                row.iter()
                    .enumerate()
                    .filter(|(i, _)| *i != ad_date)
                    .map(|(_, c)| c.clone()),
            ),
            None => out.extend(std::iter::repeat(Cell::Empty).take(ad_width)),
        }
        match store_row {
            Some(row) => out.extend(
                row.iter()
                    .enumerate()
                    .filter(|(i, _)| *i != store_date)
                    .map(|(_, c)| c.clone()),
            ),
            None => out.extend(std::iter::repeat(Cell::Empty).take(store_width)),
        }
        out
    };

    let mut merged = Table::new(headers);
    let mut store_matched = vec![false; store.rows.len()];

    // 1) every ad row, with its store matches (or alone when unmatched)
    for ad_row in &ad.rows {
        let key = ad_row[ad_date].as_date();
        let mut matched = false;
        if let Some(key) = key {
            for (s_idx, s_row) in store.rows.iter().enumerate() {
                if s_row[store_date].as_date() == Some(key) {
                    store_matched[s_idx] = true;
                    matched = true;
                    merged.rows.push(combine(&ad_row[ad_date], Some(ad_row), Some(s_row)));
                }
            }
        }
        if !matched {
            merged.rows.push(combine(&ad_row[ad_date], Some(ad_row), None));
        }
    }

    // 2) store rows no ad row claimed
    for (s_idx, s_row) in store.rows.iter().enumerate() {
        if !store_matched[s_idx] {
            merged
                .rows
                .push(combine(&s_row[store_date], None, Some(s_row)));
        }
    }

    info!(
        ad_rows = ad.rows.len(),
        store_rows = store.rows.len(),
        merged_rows = merged.rows.len(),
        "outer join on date complete"
    );
    Ok(merged)
}
