// src/process/kpi.rs
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::schema::KpiInputs;
use crate::table::{Cell, Table};

/// KPI column names, in the order they are appended to the merged table.
pub const KPI_HEADERS: [&str; 4] = ["ROAS", "CPA", "LTV", "ROI"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpiKind {
    Roas,
    Cpa,
    Ltv,
    Roi,
}

impl KpiKind {
    pub const ALL: [KpiKind; 4] = [KpiKind::Roas, KpiKind::Cpa, KpiKind::Ltv, KpiKind::Roi];

    pub fn header(self) -> &'static str {
        match self {
            KpiKind::Roas => "ROAS",
            KpiKind::Cpa => "CPA",
            KpiKind::Ltv => "LTV",
            KpiKind::Roi => "ROI",
        }
    }
}

/// Industry reference values each KPI mean is judged against.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Benchmarks {
    #[serde(default = "default_roas")]
    pub roas: f64,
    #[serde(default = "default_cpa")]
    pub cpa: f64,
    #[serde(default = "default_ltv")]
    pub ltv: f64,
    #[serde(default = "default_roi")]
    pub roi: f64,
}

fn default_roas() -> f64 {
    1.2
}

fn default_cpa() -> f64 {
    3000.0
}

fn default_ltv() -> f64 {
    6000.0
}

fn default_roi() -> f64 {
    0.1
}

impl Default for Benchmarks {
    fn default() -> Self {
        Benchmarks {
            roas: default_roas(),
            cpa: default_cpa(),
            ltv: default_ltv(),
            roi: default_roi(),
        }
    }
}

impl Benchmarks {
    /// Whether `mean` clears the benchmark for `kind`. CPA is the one
    /// lower-is-better threshold; equality clears every benchmark.
    pub fn meets(&self, kind: KpiKind, mean: f64) -> bool {
        match kind {
            KpiKind::Roas => mean >= self.roas,
            KpiKind::Cpa => mean <= self.cpa,
            KpiKind::Ltv => mean >= self.ltv,
            KpiKind::Roi => mean >= self.roi,
        }
    }
}

/// Per-KPI arithmetic means over the rows that carry a value. `None` when
/// every row is null for that KPI.
#[derive(Debug, Clone, Copy)]
pub struct KpiMeans {
    pub roas: Option<f64>,
    pub cpa: Option<f64>,
    pub ltv: Option<f64>,
    pub roi: Option<f64>,
}

impl KpiMeans {
    pub fn get(&self, kind: KpiKind) -> Option<f64> {
        match kind {
            KpiKind::Roas => self.roas,
            KpiKind::Cpa => self.cpa,
            KpiKind::Ltv => self.ltv,
            KpiKind::Roi => self.roi,
        }
    }
}

/// Append the four KPI columns to the merged table, ROAS, CPA, LTV, ROI
/// order. Returns the index of the first KPI column.
///
/// Per row: ROAS = revenue/cost, CPA = cost/cv, LTV = revenue/cv,
/// ROI = (revenue - cost)/cost. A zero, null, or unparseable operand makes
/// the affected KPI null for that row, never an error and never inf/NaN.
pub fn append_kpi_columns(table: &mut Table, inputs: KpiInputs) -> usize {
    let revenue_name = table.headers[inputs.revenue].clone();
    let cost_name = table.headers[inputs.cost].clone();
    let cv_name = table.headers[inputs.conversions].clone();

    let start = table.width();
    for h in KPI_HEADERS {
        table.headers.push(h.to_string());
    }

    for (row_idx, row) in table.rows.iter_mut().enumerate() {
        let revenue = numeric_value(&row[inputs.revenue], &revenue_name, row_idx);
        let cost = numeric_value(&row[inputs.cost], &cost_name, row_idx);
        let cv = numeric_value(&row[inputs.conversions], &cv_name, row_idx);

        row.push(ratio(revenue, cost));
        row.push(ratio(cost, cv));
        row.push(ratio(revenue, cv));
        row.push(ratio(revenue.zip(cost).map(|(r, c)| r - c), cost));
    }

    start
}

/// Numerator over denominator, or a null cell when either side is missing
/// or the denominator is zero.
fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Cell {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Cell::Number(n / d),
        _ => Cell::Empty,
    }
}

/// Numeric view of a KPI input cell. Numbers pass through, text gets one
/// parse attempt (failures are logged and become null), everything else is
/// null. Blank-ish text stays silent.
fn numeric_value(cell: &Cell, column: &str, row: usize) -> Option<f64> {
    match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<f64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    warn!(column, row, value = %s, "non-numeric value, treating as null");
                    None
                }
            }
        }
        _ => None,
    }
}

/// Means of the four KPI columns starting at `kpi_start`, nulls excluded.
pub fn kpi_means(table: &Table, kpi_start: usize) -> KpiMeans {
    let mean_of = |offset: usize| {
        let mut sum = 0.0;
        let mut count = 0usize;
        for row in &table.rows {
            if let Some(n) = row[kpi_start + offset].as_number() {
                sum += n;
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    };

    KpiMeans {
        roas: mean_of(0),
        cpa: mean_of(1),
        ltv: mean_of(2),
        roi: mean_of(3),
    }
}
