//! Derives the two-letter `state` code from a site number.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::table::{Cell, SITE_NO, STATE, Table};

static STATE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{2})-").expect("state code pattern is valid"));

/// Extracts the state from a site number such as `US-AK-0001` or `TX-00123`.
///
/// A leading `US-` country prefix is skipped. Returns `None` when the
/// remainder does not start with two uppercase letters and a hyphen.
pub fn extract_state(site_no: &str) -> Option<String> {
    let site_no = site_no.trim();
    let rest = site_no.strip_prefix("US-").unwrap_or(site_no);
    STATE_CODE
        .captures(rest)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Adds a `state` column directly after `Site No`.
///
/// An existing `state` column is replaced. Rows whose site number does not
/// carry a state get an empty cell. Returns the number of rows left without a state.
pub fn add_state_column(table: &mut Table) -> Option<usize> {
    let site_no_idx = table.column_index(SITE_NO)?;

    if table.drop_column(STATE) {
        debug!("Replacing existing state column");
    }
    // Dropping may have shifted Site No left.
    let site_no_idx = table.column_index(SITE_NO).unwrap_or(site_no_idx);

    let states: Vec<Cell> = table
        .column(site_no_idx)
        .map(|cell| match extract_state(&cell.to_string()) {
            Some(code) => Cell::Text(code),
            None => Cell::Empty,
        })
        .collect();

    let unmatched = states.iter().filter(|c| c.is_empty()).count();
    if unmatched > 0 {
        warn!(unmatched, "Site numbers without a recognizable state");
    }

    table.insert_column_after(SITE_NO, STATE, states)?;
    Some(unmatched)
}
