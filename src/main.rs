//! CLI entry point for the site type report.
//!
//! Loads a site list, derives each site's state, filters out undated and
//! TWR-IP sites, and writes the summary tables plus an interactive chart.

use anyhow::Result;
use clap::Parser;
use site_type_report::pipeline::{PipelineConfig, run};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "site_type_report")]
#[command(about = "Summarize a tower site list by site type", long_about = None)]
struct Cli {
    /// Path to input Excel/CSV file
    #[arg(short, long, default_value = "Python Exercise Data.xlsx")]
    input: PathBuf,

    /// Excel sheet name. If omitted, the sheet with the most rows is used
    #[arg(short, long)]
    sheet: Option<String>,

    /// Output folder
    #[arg(short, long, default_value = "outputs")]
    outputs: PathBuf,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/site_type_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("site_type_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::new(cli.input, cli.outputs).with_sheet(cli.sheet);

    match run(&config) {
        Ok(report) => {
            info!(
                file = %config.input.display(),
                rows = report.loaded_rows,
                cols = report.loaded_columns,
                filtered_rows = report.filtered.len(),
                site_types = report.summary.len(),
                "Run complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            Err(e.into())
        }
    }
}
