//! Column-name schema for the two input tables: which physical headers carry
//! the date, revenue, cost, and conversion figures. Resolution happens once,
//! up front, so a misnamed column fails the run before any derivation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::table::Table;

/// Logical-to-physical column mapping. Date columns are ordered candidate
/// lists because the two sources disagree on naming; earlier entries win.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchemaMapping {
    #[serde(default = "default_store_date_candidates")]
    pub store_date_candidates: Vec<String>,
    #[serde(default = "default_ad_date_candidates")]
    pub ad_date_candidates: Vec<String>,
    #[serde(default = "default_revenue")]
    pub revenue: String,
    #[serde(default = "default_cost")]
    pub cost: String,
    #[serde(default = "default_conversions")]
    pub conversions: String,
}

fn default_store_date_candidates() -> Vec<String> {
    vec!["Date".to_string()]
}

fn default_ad_date_candidates() -> Vec<String> {
    vec!["Date".to_string(), "Day".to_string()]
}

fn default_revenue() -> String {
    "Revenue".to_string()
}

fn default_cost() -> String {
    "Cost".to_string()
}

fn default_conversions() -> String {
    "CV".to_string()
}

impl Default for SchemaMapping {
    fn default() -> Self {
        SchemaMapping {
            store_date_candidates: default_store_date_candidates(),
            ad_date_candidates: default_ad_date_candidates(),
            revenue: default_revenue(),
            cost: default_cost(),
            conversions: default_conversions(),
        }
    }
}

/// A required column could not be resolved. Aborts the run with no partial
/// output.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("store table has no date column, tried {tried:?}")]
    StoreDateColumn { tried: Vec<String> },
    #[error("ad tables have no date column, tried {tried:?}")]
    AdDateColumn { tried: Vec<String> },
    #[error("merged table has no `{0}` column")]
    KpiColumn(String),
}

/// Index of the first candidate present in the table's header.
pub fn find_date_column(table: &Table, candidates: &[String]) -> Option<usize> {
    candidates.iter().find_map(|c| table.column_index(c))
}

/// Column indexes for the three KPI inputs on the merged table.
#[derive(Debug, Clone, Copy)]
pub struct KpiInputs {
    pub revenue: usize,
    pub cost: usize,
    pub conversions: usize,
}

/// Resolve all three KPI input columns against the merged header, failing on
/// the first one missing.
pub fn resolve_kpi_inputs(table: &Table, mapping: &SchemaMapping) -> Result<KpiInputs, SchemaError> {
    let lookup = |name: &str| {
        table
            .column_index(name)
            .ok_or_else(|| SchemaError::KpiColumn(name.to_string()))
    };
    Ok(KpiInputs {
        revenue: lookup(&mapping.revenue)?,
        cost: lookup(&mapping.cost)?,
        conversions: lookup(&mapping.conversions)?,
    })
}
