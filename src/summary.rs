//! Site type counts and average structure heights.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::table::{SITE_TYPE, STRUCTURE_HEIGHT, Table, YEAR_BUILT};

/// Header row of the summary CSV. Must list the serde names of [`SiteTypeCount`] in order.
pub const SUMMARY_HEADERS: [&str; 2] = ["Site Type", "Number of Sites"];

/// Header row of the average-height CSV. Must list the serde names of [`YearHeight`] in order.
pub const AVG_HEIGHT_HEADERS: [&str; 3] = ["Year Built", "Site Type", "Avg Height (AGL)"];

/// One row of the site-type summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteTypeCount {
    #[serde(rename = "Site Type")]
    pub site_type: String,
    #[serde(rename = "Number of Sites")]
    pub count: usize,
}

/// Mean structure height for one site type in one build year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearHeight {
    #[serde(rename = "Year Built")]
    pub year_built: i32,
    #[serde(rename = "Site Type")]
    pub site_type: String,
    #[serde(rename = "Avg Height (AGL)")]
    pub avg_height: f64,
}

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Counts rows per `Site Type`, ordered by descending count then name.
///
/// Blank site types are counted under an empty name so the counts always
/// sum to the table length.
pub fn site_type_summary(table: &Table) -> Vec<SiteTypeCount> {
    let Some(idx) = table.column_index(SITE_TYPE) else {
        return Vec::new();
    };

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for cell in table.column(idx) {
        *counts.entry(cell.to_string()).or_default() += 1;
    }

    let mut summary: Vec<SiteTypeCount> = counts
        .into_iter()
        .map(|(site_type, count)| SiteTypeCount { site_type, count })
        .collect();
    // BTreeMap order is already by name; a stable sort keeps it for ties.
    summary.sort_by(|a, b| b.count.cmp(&a.count));
    summary
}

/// Coerces a `Year Built` value to a whole year.
fn as_year(value: f64) -> Option<i32> {
    let year = value.trunc();
    (year >= i32::MIN as f64 && year <= i32::MAX as f64).then_some(year as i32)
}

/// Averages `Overall Structure Height (AGL)` per (`Site Type`, `Year Built`).
///
/// Rows whose year or height is missing or non-numeric are skipped. Output is
/// sorted by site type, then year.
pub fn avg_height_by_year(table: &Table) -> Vec<YearHeight> {
    let (Some(type_idx), Some(year_idx), Some(height_idx)) = (
        table.column_index(SITE_TYPE),
        table.column_index(YEAR_BUILT),
        table.column_index(STRUCTURE_HEIGHT),
    ) else {
        return Vec::new();
    };

    let mut groups: BTreeMap<(String, i32), Vec<f64>> = BTreeMap::new();
    for row in table.rows() {
        let Some(year) = row[year_idx].as_f64().and_then(as_year) else {
            continue;
        };
        let Some(height) = row[height_idx].as_f64() else {
            continue;
        };
        groups
            .entry((row[type_idx].to_string(), year))
            .or_default()
            .push(height);
    }

    groups
        .into_iter()
        .map(|((site_type, year_built), heights)| YearHeight {
            year_built,
            site_type,
            avg_height: mean(&heights),
        })
        .collect()
}
