use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::process::kpi::Benchmarks;
use crate::schema::SchemaMapping;

/// Everything tunable about one report run: where the inputs keep their
/// columns, and what the KPI means are judged against. The defaults match
/// the standard export layout and the usual industry reference values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub schema: SchemaMapping,
    #[serde(default)]
    pub benchmarks: Benchmarks,
}

impl ReportConfig {
    /// Load a config from a YAML file. Absent fields keep their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config {:?}", path.as_ref()))?;
        let config = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {:?}", path.as_ref()))?;
        Ok(config)
    }
}
