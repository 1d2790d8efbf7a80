//! Row filters: missing start dates and TWR-IP site types.

use tracing::info;

use crate::table::{Cell, DATE_START, SITE_TYPE, Table};

/// Which filters [`filter_sites`] applies. Both are on by default.
#[derive(Debug, Clone, Copy)]
pub struct FilterOptions {
    pub require_start_date: bool,
    pub exclude_twr_ip: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            require_start_date: true,
            exclude_twr_ip: true,
        }
    }
}

/// Row counts removed by each filter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterReport {
    pub missing_start_date: usize,
    pub twr_ip: usize,
}

/// Returns true for any spelling of the TWR-IP site type.
///
/// Case, whitespace and hyphens are ignored, and anything that starts with
/// `TWRIP` after that normalization matches (`TWR - IP`, `twr ip`, `TWR-IP-A`).
pub fn is_twr_ip(site_type: &str) -> bool {
    let normalized: String = site_type
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect();
    normalized.starts_with("TWRIP")
}

/// Applies the enabled filters in place.
///
/// `Date Start` cells that parse are rewritten as dates; unparseable ones
/// count as missing. Columns absent from the table disable their filter.
#[tracing::instrument(skip(table), fields(rows_in = table.len()))]
pub fn filter_sites(table: &mut Table, options: FilterOptions) -> FilterReport {
    let mut report = FilterReport::default();

    if let Some(idx) = table.column_index(DATE_START) {
        for row in table.rows_mut() {
            if let Some(date) = row[idx].as_date() {
                row[idx] = Cell::Date(date);
            } else {
                row[idx] = Cell::Empty;
            }
        }

        if options.require_start_date {
            let before = table.len();
            table.retain_rows(|row| !row[idx].is_empty());
            report.missing_start_date = before - table.len();
        }
    }

    if options.exclude_twr_ip {
        if let Some(idx) = table.column_index(SITE_TYPE) {
            let before = table.len();
            table.retain_rows(|row| !is_twr_ip(&row[idx].to_string()));
            report.twr_ip = before - table.len();
        }
    }

    info!(
        rows_out = table.len(),
        dropped_missing_start = report.missing_start_date,
        dropped_twr_ip = report.twr_ip,
        "Sites filtered"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table(rows: &[(&str, &str)]) -> Table {
        Table::new(
            vec!["Site Type".into(), "Date Start".into()],
            rows.iter()
                .map(|(t, d)| vec![Cell::from_text(t), Cell::from_text(d)])
                .collect(),
        )
    }

    #[test]
    fn test_is_twr_ip_variants() {
        for variant in ["TWR-IP", "TWR IP", "TWR - IP", "twr-ip", "TWRIP", "TWR-IP-A", " Twr Ip "] {
            assert!(is_twr_ip(variant), "{variant} should match");
        }
        for other in ["TWR", "Macro", "Rooftop", "IP-TWR", "TWR-I"] {
            assert!(!is_twr_ip(other), "{other} should not match");
        }
    }

    #[test]
    fn test_filter_drops_missing_and_invalid_dates() {
        let mut t = table(&[("Macro", "2020-01-01"), ("Macro", ""), ("Macro", "soon")]);
        let report = filter_sites(&mut t, FilterOptions::default());

        assert_eq!(t.len(), 1);
        assert_eq!(report.missing_start_date, 2);
        assert_eq!(
            t.rows()[0][1],
            Cell::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_filter_drops_twr_ip_regardless_of_date() {
        let mut t = table(&[("TWR-IP-A", "2020-01-01"), ("Macro", "01/05/2019")]);
        let report = filter_sites(&mut t, FilterOptions::default());

        assert_eq!(t.len(), 1);
        assert_eq!(report.twr_ip, 1);
        assert_eq!(t.rows()[0][0], Cell::from_text("Macro"));
    }

    #[test]
    fn test_missing_date_excluded_regardless_of_type() {
        let mut t = table(&[("Macro", ""), ("Rooftop", "")]);
        filter_sites(&mut t, FilterOptions::default());
        assert!(t.is_empty());
    }

    #[test]
    fn test_filters_can_be_disabled() {
        let mut t = table(&[("TWR IP", ""), ("Macro", "2020-01-01")]);
        let report = filter_sites(
            &mut t,
            FilterOptions {
                require_start_date: false,
                exclude_twr_ip: false,
            },
        );

        assert_eq!(t.len(), 2);
        assert_eq!(report, FilterReport::default());
    }

    #[test]
    fn test_output_invariants_hold() {
        let mut t = table(&[
            ("Macro", "2020-01-01"),
            ("TWR-IP", "2020-01-01"),
            ("Rooftop", ""),
            ("twr ip", "2021-03-04"),
            ("Monopole", "2018/07/09"),
        ]);
        filter_sites(&mut t, FilterOptions::default());

        assert_eq!(t.len(), 2);
        for row in t.rows() {
            assert!(!row[1].is_empty());
            assert!(!is_twr_ip(&row[0].to_string()));
        }
    }
}
