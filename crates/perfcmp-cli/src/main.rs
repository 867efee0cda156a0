//! perfcmp command line.
//!
//! Compares two performance-test reports and either writes the comparison
//! workbook to a local file or publishes it to the configured object store.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use perfcmp_core::config::{env_vars, StoreKind};
use perfcmp_core::export::write_workbook;
use perfcmp_core::report::io::read_report;
use perfcmp_core::{
    build_workbook, ExportConfig, MetricKey, PerfCmpError, ReportExporter, DEFAULT_METRICS,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "perfcmp", version, about = "Compare two performance-test reports")]
struct Cli {
    /// Report of the first (baseline) execution.
    report1: PathBuf,

    /// Report of the second execution.
    report2: PathBuf,

    /// Metric to compare; repeat for several. Defaults to the eight
    /// standard response-time metrics.
    #[arg(long = "metric", value_name = "KEY")]
    metrics: Vec<String>,

    /// Write the workbook to this file instead of uploading it.
    #[arg(long, short)]
    output: Option<PathBuf>,

    #[arg(long, env = env_vars::BUCKET)]
    bucket: Option<String>,

    #[arg(long, env = env_vars::STORE)]
    store: Option<StoreKind>,

    #[arg(long, env = env_vars::ENDPOINT)]
    endpoint: Option<String>,

    #[arg(long, env = env_vars::URL_TEMPLATE)]
    url_template: Option<String>,

    #[arg(long, env = env_vars::REGION)]
    region: Option<String>,

    /// Print per-sheet summaries as JSON on stdout.
    #[arg(long)]
    summary_json: bool,
}

impl Cli {
    fn metric_keys(&self) -> Vec<MetricKey> {
        if self.metrics.is_empty() {
            DEFAULT_METRICS.to_vec()
        } else {
            self.metrics.iter().map(|m| MetricKey::from(m.as_str())).collect()
        }
    }

    /// Flags win over the environment; variables without a flag are read
    /// from the process environment.
    fn export_config(&self) -> Result<ExportConfig, PerfCmpError> {
        ExportConfig::from_lookup(|name| {
            let flag = match name {
                env_vars::BUCKET => self.bucket.clone(),
                env_vars::STORE => self.store.map(|s| s.to_string()),
                env_vars::ENDPOINT => self.endpoint.clone(),
                env_vars::URL_TEMPLATE => self.url_template.clone(),
                env_vars::REGION => self.region.clone(),
                _ => None,
            };
            flag.or_else(|| std::env::var(name).ok())
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli).await {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Appended to the printed URL when the memory store was used.
const DRY_RUN_NOTICE: &str = "(dry run: memory store, nothing was uploaded)";

/// Run one comparison and return what should go to stdout.
async fn run(cli: &Cli) -> Result<String, PerfCmpError> {
    let report1 = read_report(&cli.report1).await?;
    let report2 = read_report(&cli.report2).await?;
    let metrics = cli.metric_keys();

    let workbook = build_workbook(&report1, &report2, &metrics)?;

    let mut dry_run = false;
    let (url, out) = match &cli.output {
        Some(path) => {
            write_workbook(&workbook, path).await?;
            tracing::info!(path = %path.display(), sheets = workbook.sheets.len(), "workbook written");
            (None, path.display().to_string())
        }
        None => {
            let config = cli.export_config()?;
            dry_run = config.store == StoreKind::Memory;
            let exporter = ReportExporter::from_config(&config)?;
            let url = exporter.export(&workbook).await?;
            if dry_run {
                tracing::warn!(%url, "memory store: nothing was uploaded");
                (Some(url.clone()), format!("{url} {DRY_RUN_NOTICE}"))
            } else {
                (Some(url.clone()), url)
            }
        }
    };

    if cli.summary_json {
        let summary = json!({
            "url": url,
            "dry_run": dry_run,
            "output": cli.output.as_ref().map(|p| p.display().to_string()),
            "sheets": workbook.overview(),
        });
        return Ok(serde_json::to_string_pretty(&summary)?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
