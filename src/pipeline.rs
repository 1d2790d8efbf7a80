//! The end-to-end run: load, derive state, filter, summarize, chart, export.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::chart::{build_series, render_html};
use crate::error::{PipelineError, Result};
use crate::filter::{FilterOptions, FilterReport, filter_sites};
use crate::loader::load_table;
use crate::output::{
    AVG_HEIGHT_FILE, CHART_FILE, FILTERED_FILE, SUMMARY_FILE, log_summary, write_records,
    write_table, write_text,
};
use crate::state::add_state_column;
use crate::summary::{
    AVG_HEIGHT_HEADERS, SUMMARY_HEADERS, SiteTypeCount, YearHeight, avg_height_by_year,
    site_type_summary,
};
use crate::table::{REQUIRED_COLUMNS, Table};

const SUMMARY_PREVIEW_ROWS: usize = 20;

/// Inputs for a single run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub sheet: Option<String>,
    pub output_dir: PathBuf,
    pub filters: FilterOptions,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            sheet: None,
            output_dir: output_dir.into(),
            filters: FilterOptions::default(),
        }
    }

    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }
}

/// Paths of every artifact a run writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub summary: PathBuf,
    pub filtered: PathBuf,
    pub avg_height: PathBuf,
    pub chart: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            summary: dir.join(SUMMARY_FILE),
            filtered: dir.join(FILTERED_FILE),
            avg_height: dir.join(AVG_HEIGHT_FILE),
            chart: dir.join(CHART_FILE),
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub loaded_rows: usize,
    pub loaded_columns: usize,
    pub filter: FilterReport,
    pub filtered: Table,
    pub summary: Vec<SiteTypeCount>,
    pub avg_heights: Vec<YearHeight>,
    pub outputs: OutputPaths,
}

/// Checks that every required column is present.
pub fn validate_columns(table: &Table) -> Result<()> {
    let missing = table.missing_columns(REQUIRED_COLUMNS);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::Schema(missing))
    }
}

/// Runs every stage in order and writes the artifacts to `config.output_dir`.
///
/// # Errors
///
/// Any load failure, a missing required column, an empty table after
/// filtering, or a failed write ends the run.
#[tracing::instrument(skip(config), fields(input = %config.input.display()))]
pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    let mut vertical_bridge = load_table(&config.input, config.sheet.as_deref())?;
    validate_columns(&vertical_bridge)?;

    let loaded_rows = vertical_bridge.len();
    let loaded_columns = vertical_bridge.width();
    info!(rows = loaded_rows, cols = loaded_columns, "Loaded data");

    // Site No presence was validated above.
    add_state_column(&mut vertical_bridge);

    let filter = filter_sites(&mut vertical_bridge, config.filters);
    if vertical_bridge.is_empty() {
        return Err(PipelineError::EmptyResult(format!(
            "all {} rows lacked a Date Start or were TWR-IP sites",
            loaded_rows
        )));
    }
    info!(rows = vertical_bridge.len(), "Filtered data (Date Start present, TWR-IP removed)");

    let summary = site_type_summary(&vertical_bridge);
    let avg_heights = avg_height_by_year(&vertical_bridge);
    if avg_heights.is_empty() {
        tracing::warn!("No rows with numeric Year Built and height; chart will be empty");
    }
    let series = build_series(&avg_heights);

    fs::create_dir_all(&config.output_dir)?;
    let outputs = OutputPaths::in_dir(&config.output_dir);

    write_records(&outputs.summary, &SUMMARY_HEADERS, &summary)?;
    write_table(&outputs.filtered, &vertical_bridge)?;
    write_records(&outputs.avg_height, &AVG_HEIGHT_HEADERS, &avg_heights)?;
    write_text(&outputs.chart, &render_html(&series))?;

    log_summary(&summary, SUMMARY_PREVIEW_ROWS);
    for path in [
        &outputs.summary,
        &outputs.filtered,
        &outputs.avg_height,
        &outputs.chart,
    ] {
        info!(path = %path.display(), "Output written");
    }

    Ok(RunReport {
        loaded_rows,
        loaded_columns,
        filter,
        filtered: vertical_bridge,
        summary,
        avg_heights,
        outputs,
    })
}
