//! Output formatting and persistence for pipeline results.
//!
//! Every writer truncates its target, so repeated runs over the same input
//! produce identical files.

use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::summary::SiteTypeCount;
use crate::table::Table;

pub const SUMMARY_FILE: &str = "site_type_summary_filtered.csv";
pub const FILTERED_FILE: &str = "filtered_sites_with_state.csv";
pub const AVG_HEIGHT_FILE: &str = "avg_height_by_year_site_type.csv";
pub const CHART_FILE: &str = "avg_height_by_year_site_type.html";

/// Writes serializable records to a CSV file with a header row.
///
/// The header is emitted even when `records` is empty.
pub fn write_records<T: Serialize>(path: &Path, headers: &[&str], records: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = records.len(), "Writing CSV records");

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(headers)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes the full table, header first, rendering each cell as text.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    debug!(path = %path.display(), rows = table.len(), "Writing table");

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes a text document such as the rendered chart.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    debug!(path = %path.display(), bytes = content.len(), "Writing document");
    fs::write(path, content)?;
    Ok(())
}

/// Logs the first `limit` summary rows as an aligned table.
pub fn log_summary(summary: &[SiteTypeCount], limit: usize) {
    let width = summary
        .iter()
        .take(limit)
        .map(|s| s.site_type.len())
        .max()
        .unwrap_or(0)
        .max("Site Type".len());

    info!("{:<width$}  Number of Sites", "Site Type");
    for row in summary.iter().take(limit) {
        info!("{:<width$}  {:>15}", row.site_type, row.count);
    }
    if summary.len() > limit {
        info!(remaining = summary.len() - limit, "Summary truncated");
    }
}
