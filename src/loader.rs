//! Loads a site list from CSV or a spreadsheet into a [`Table`].

use calamine::{Data, Range, Reader, open_workbook_auto};
use std::path::Path;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::table::{Cell, Table};

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Reads `path` into a table, dispatching on its extension.
///
/// For spreadsheets, `sheet` selects the worksheet by name; when `None` the
/// non-empty sheet with the most data rows is used.
///
/// # Errors
///
/// - [`PipelineError::InputNotFound`] if `path` does not exist.
/// - [`PipelineError::UnsupportedFormat`] for unknown extensions.
/// - [`PipelineError::Parse`] if the file is not readable as tabular data.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table> {
    if !path.exists() {
        return Err(PipelineError::InputNotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let table = if ext == "csv" {
        load_csv(path)?
    } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        load_workbook(path, sheet)?
    } else {
        let shown = if ext.is_empty() {
            "(none)".to_string()
        } else {
            format!(".{ext}")
        };
        return Err(PipelineError::UnsupportedFormat(shown));
    };

    debug!(rows = table.len(), cols = table.width(), "Input loaded");
    Ok(table)
}

/// Reads a headed CSV file. Header names are trimmed; blank fields become empty cells.
///
/// Short records are padded. A record with more fields than the header is a
/// [`PipelineError::Parse`] unless the surplus fields are all blank.
pub fn load_csv(path: &Path) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| PipelineError::parse(path, e))?;

    let columns: Vec<String> = rdr
        .headers()
        .map_err(|e| PipelineError::parse(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if columns.iter().all(|c| c.is_empty()) {
        return Err(PipelineError::parse(path, "no header row"));
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| PipelineError::parse(path, e))?;
        if record.iter().skip(columns.len()).any(|f| !f.trim().is_empty()) {
            let line = record.position().map_or(0, |p| p.line());
            return Err(PipelineError::parse(
                path,
                format!(
                    "line {} has {} fields but the header has {}",
                    line,
                    record.len(),
                    columns.len()
                ),
            ));
        }
        rows.push(record.iter().take(columns.len()).map(Cell::from_text).collect());
    }

    debug!(rows = rows.len(), "CSV records read");
    Ok(Table::new(columns, rows))
}

/// Reads one worksheet of a workbook; the first row is the header.
pub fn load_workbook(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|e| PipelineError::parse(path, e))?;
    let names = workbook.sheet_names();

    let range = match sheet {
        Some(name) => {
            if !names.iter().any(|n| n == name) {
                return Err(PipelineError::parse(
                    path,
                    format!("sheet '{}' not found (available: {})", name, names.join(", ")),
                ));
            }
            workbook
                .worksheet_range(name)
                .map_err(|e| PipelineError::parse(path, e))?
        }
        None => {
            let mut best: Option<(String, Range<Data>)> = None;
            for name in &names {
                let range = workbook
                    .worksheet_range(name)
                    .map_err(|e| PipelineError::parse(path, e))?;
                if range.width() == 0 {
                    continue;
                }
                let better = best
                    .as_ref()
                    .is_none_or(|(_, current)| range.height() > current.height());
                if better {
                    best = Some((name.clone(), range));
                }
            }
            let (name, range) = best.ok_or_else(|| PipelineError::parse(path, "workbook has no data"))?;
            debug!(sheet = %name, "Selected sheet with the most rows");
            range
        }
    };

    table_from_range(&range).ok_or_else(|| PipelineError::parse(path, "sheet has no header row"))
}

fn table_from_range(range: &Range<Data>) -> Option<Table> {
    let mut rows = range.rows();
    let columns: Vec<String> = rows
        .next()?
        .iter()
        .map(|c| convert_cell(c).to_string().trim().to_string())
        .collect();

    let body = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Some(Table::new(columns, body))
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::from_text(s),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.time() == chrono::NaiveTime::MIN => Cell::Date(ndt.date()),
            Some(ndt) => Cell::DateTime(ndt),
            None => Cell::Empty,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from_text(s),
    }
}
