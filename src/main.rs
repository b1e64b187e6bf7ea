use adreport::{ingest, process, ReportConfig};
use anyhow::{Context, Result};
use clap::Parser;
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge store visit and ad performance workbooks into a KPI report"
)]
struct Args {
    /// Store visit workbook; its first sheet is used
    #[arg(long)]
    store: PathBuf,
    /// Ad performance workbook; every sheet with data is used
    #[arg(long)]
    ads: PathBuf,
    /// Where to write the report workbook
    #[arg(long, default_value = "kpi_report.xlsx")]
    out: PathBuf,
    /// Optional YAML config with the schema mapping and benchmarks
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,adreport=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) parse args & load config ─────────────────────────────────
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ReportConfig::from_yaml_file(path)?,
        None => ReportConfig::default(),
    };

    // ─── 3) ingest both workbooks ────────────────────────────────────
    let store = ingest::load_store_table(&args.store)?;
    let ads = ingest::load_ad_tables(&args.ads)?;

    // ─── 4) merge, derive KPIs, build the report ─────────────────────
    let buffer = process(store, ads, &config)?;

    // ─── 5) write the workbook ───────────────────────────────────────
    fs::write(&args.out, &buffer)
        .with_context(|| format!("writing report to {:?}", args.out))?;
    info!(path = %args.out.display(), bytes = buffer.len(), "report written");
    Ok(())
}
