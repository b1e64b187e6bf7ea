pub mod config;
pub mod ingest;
pub mod process;
pub mod report;
pub mod schema;
pub mod table;

pub use config::ReportConfig;
pub use process::process;
pub use schema::SchemaError;
pub use table::{Cell, Table};
