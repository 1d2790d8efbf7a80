//! Interactive multi-line chart of average height by build year.
//!
//! The chart is a self-contained HTML page with plotly.js embedded, so it
//! opens offline. Each site type becomes one trace sharing the `Year Built` axis.

use plotly::common::Mode;
use plotly::layout::{Axis, HoverMode, Legend};
use plotly::{Layout, Plot, Scatter};
use tracing::warn;

use crate::summary::YearHeight;

pub const CHART_TITLE: &str = "Average Overall Structure Height (AGL) by Year Built and Site Type";

/// One line of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub site_type: String,
    pub years: Vec<i32>,
    pub heights: Vec<f64>,
}

impl ChartSeries {
    /// A single year cannot form a line; such series are drawn as markers only.
    pub fn is_drawable_as_line(&self) -> bool {
        self.years.len() >= 2
    }

    fn mode(&self) -> Mode {
        if self.is_drawable_as_line() {
            Mode::LinesMarkers
        } else {
            Mode::Markers
        }
    }
}

/// Splits averaged rows into one series per site type.
///
/// Expects rows sorted by site type then year, as produced by
/// [`avg_height_by_year`](crate::summary::avg_height_by_year).
pub fn build_series(rows: &[YearHeight]) -> Vec<ChartSeries> {
    let mut series: Vec<ChartSeries> = Vec::new();

    for row in rows {
        match series.last_mut() {
            Some(s) if s.site_type == row.site_type => {
                s.years.push(row.year_built);
                s.heights.push(row.avg_height);
            }
            _ => series.push(ChartSeries {
                site_type: row.site_type.clone(),
                years: vec![row.year_built],
                heights: vec![row.avg_height],
            }),
        }
    }

    for s in series.iter().filter(|s| !s.is_drawable_as_line()) {
        warn!(
            site_type = %s.site_type,
            "Only one Year Built value; drawing as a single point"
        );
    }

    series
}

/// Builds the Plotly figure for the given series.
pub fn build_plot(series: &[ChartSeries]) -> Plot {
    let mut plot = Plot::new();

    for s in series {
        let trace = Scatter::new(s.years.clone(), s.heights.clone())
            .name(&s.site_type)
            .mode(s.mode())
            .hover_template("Year %{x}<br>Avg height %{y:.1f}<extra>%{fullData.name}</extra>");
        plot.add_trace(trace);
    }

    let layout = Layout::new()
        .title(CHART_TITLE)
        .x_axis(Axis::new().title("Year Built").dtick(1.0))
        .y_axis(Axis::new().title("Average Overall Structure Height (AGL)"))
        .legend(Legend::new().title("Site Type"))
        .hover_mode(HoverMode::Closest);
    plot.set_layout(layout);

    plot
}

/// Renders the series as a standalone HTML document.
pub fn render_html(series: &[ChartSeries]) -> String {
    build_plot(series).to_html()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn row(site_type: &str, year_built: i32, avg_height: f64) -> YearHeight {
        YearHeight {
            year_built,
            site_type: site_type.into(),
            avg_height,
        }
    }

    fn figure(series: &[ChartSeries]) -> Value {
        serde_json::from_str(&build_plot(series).to_json()).unwrap()
    }

    #[test]
    fn test_build_series_one_per_site_type() {
        let series = build_series(&[
            row("Macro", 1999, 50.0),
            row("Macro", 2001, 150.0),
            row("Rooftop", 2005, 30.5),
        ]);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].site_type, "Macro");
        assert_eq!(series[0].years, vec![1999, 2001]);
        assert_eq!(series[0].heights, vec![50.0, 150.0]);
        assert!(series[0].is_drawable_as_line());
        assert!(!series[1].is_drawable_as_line());
    }

    #[test]
    fn test_figure_modes() {
        let series = build_series(&[
            row("Macro", 1999, 50.0),
            row("Macro", 2001, 150.0),
            row("Rooftop", 2005, 30.5),
        ]);
        let fig = figure(&series);

        assert_eq!(fig["data"][0]["mode"], "lines+markers");
        assert_eq!(fig["data"][1]["mode"], "markers");
        assert_eq!(fig["data"][1]["name"], "Rooftop");
        assert_eq!(fig["data"][0]["x"], serde_json::json!([1999, 2001]));
        assert_eq!(fig["layout"]["xaxis"]["title"]["text"], "Year Built");
    }

    #[test]
    fn test_render_html_is_standalone_page() {
        let html = render_html(&build_series(&[row("Macro", 1999, 50.0)]));

        assert!(html.to_lowercase().starts_with("<!doctype html>"));
        assert!(html.contains("Plotly.newPlot"));
        assert!(html.contains("Macro"));
    }

    #[test]
    fn test_render_html_has_no_external_scripts() {
        let html = render_html(&build_series(&[row("Macro", 1999, 50.0)]));

        let external = regex::Regex::new(r"<script[^>]*\bsrc=").unwrap();
        assert!(!external.is_match(&html));
        // plotly.js itself is inlined.
        assert!(html.len() > 1_000_000);
    }

    #[test]
    fn test_render_html_is_deterministic() {
        let series = build_series(&[row("Macro", 1999, 50.0), row("Macro", 2001, 60.0)]);
        assert_eq!(render_html(&series), render_html(&series));
    }

    #[test]
    fn test_empty_series_renders() {
        let fig = figure(&[]);
        assert_eq!(fig["data"], serde_json::json!([]));
    }
}
