//! Chart construction.
//!
//! A [`Chart`] is a render-agnostic description: titles, axis labels, one
//! line per series, and vertical administration markers. The TUI draws it
//! with Plotters, the CLI draws it as ASCII, and `Chart::long_rows` gives the
//! tidy table for export.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{ChartSelection, DetentionRow, MonthlySeries};
use crate::error::AppError;

pub mod detentions;
pub mod encounters;

pub use detentions::*;
pub use encounters::*;

/// A named line on the chart, ordered by date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Dashed vertical line at the start of a presidential administration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdministrationMarker {
    /// Empty when there is no room for a label.
    pub president: &'static str,
    pub start: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// Column name the series names go under in the long table.
    pub legend_title: &'static str,
    /// Column name the values go under in the long table.
    pub value_name: &'static str,
    pub series: Vec<Series>,
    pub markers: Vec<AdministrationMarker>,
}

/// One row of the melted (date, series, value) table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRow {
    pub date: NaiveDate,
    pub series: String,
    pub value: f64,
}

impl Chart {
    pub fn series_names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Largest value across all series; 0.0 for an empty chart.
    pub fn max_y(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|&(_, y)| y))
            .filter(|y| y.is_finite())
            .fold(None, |acc: Option<f64>, y| Some(acc.map_or(y, |m| m.max(y))))
            .unwrap_or(0.0)
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.series.iter().flat_map(|s| s.points.iter().map(|&(d, _)| d));
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Markers that fall inside the plotted date range.
    pub fn visible_markers(&self) -> Vec<AdministrationMarker> {
        let Some((lo, hi)) = self.date_range() else {
            return Vec::new();
        };
        self.markers
            .iter()
            .copied()
            .filter(|m| m.start >= lo && m.start <= hi)
            .collect()
    }

    /// Wide-to-long reshape: one row per (series, date), series in legend order.
    pub fn long_rows(&self) -> Vec<LongRow> {
        self.series
            .iter()
            .flat_map(|s| {
                s.points.iter().map(move |&(date, value)| LongRow {
                    date,
                    series: s.name.clone(),
                    value,
                })
            })
            .collect()
    }
}

/// Where chart construction gets its data from.
///
/// Implemented by the dashboard (cached fetches) and by test fixtures.
pub trait ChartData {
    fn detentions(&mut self) -> Result<&[DetentionRow], AppError>;
    fn encounters(&mut self) -> Result<&MonthlySeries, AppError>;
}

/// Build the chart for `selection`.
pub fn build_chart<D: ChartData + ?Sized>(selection: ChartSelection, data: &mut D) -> Result<Chart, AppError> {
    use crate::domain::Display;

    let chart = match selection {
        ChartSelection::ArrestingAuthority(Display::Count) => aa_count_chart(data.detentions()?),
        ChartSelection::ArrestingAuthority(Display::Percent) => aa_pct_chart(data.detentions()?),
        ChartSelection::Criminality(Display::Count, authority) => {
            criminality_count_chart(data.detentions()?, authority)
        }
        ChartSelection::Criminality(Display::Percent, authority) => {
            criminality_pct_chart(data.detentions()?, authority)
        }
        ChartSelection::BorderPatrol => encounters_chart(data.encounters()?),
    };
    tracing::debug!(?selection, series = chart.series.len(), "chart built");
    Ok(chart)
}

/// `round(part / whole * 100)`, half to even. `None` when `whole` is zero.
pub fn percent(part: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    Some((part as f64 / whole as f64 * 100.0).round_ties_even())
}

pub(crate) fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    // Only called with literal, valid dates.
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::data::parse_detentions;
    use crate::domain::MonthlyRecord;

    pub const TWO_ROWS: &str = r#"[
        {"date": "09/21/2025", "ice_all": 41000, "ice_conv": 12000, "ice_pend": 9000, "ice_other": 20000,
         "cbp_all": 18000, "cbp_conv": 4000, "cbp_pend": 3000, "cbp_other": 11000,
         "total_all": 59000, "total_conv": 16000, "total_pend": 12000, "total_other": 31000},
        {"date": "09/07/2025", "ice_all": 39500, "ice_conv": 11800, "ice_pend": 8900, "ice_other": 18800,
         "cbp_all": 19700, "cbp_conv": 4100, "cbp_pend": 3200, "cbp_other": 12400,
         "total_all": 59200, "total_conv": 15900, "total_pend": 12100, "total_other": 31200}
    ]"#;

    pub struct Fixture {
        pub rows: Vec<DetentionRow>,
        pub series: MonthlySeries,
        pub detention_calls: usize,
    }

    impl Fixture {
        pub fn new() -> Self {
            let records = (1..=12)
                .map(|m| MonthlyRecord {
                    date: ymd(2024, m, 1),
                    encounters: 1000 * m as u64,
                })
                .collect();
            Self {
                rows: parse_detentions(TWO_ROWS).unwrap(),
                series: MonthlySeries::try_from_records(records).unwrap(),
                detention_calls: 0,
            }
        }
    }

    impl ChartData for Fixture {
        fn detentions(&mut self) -> Result<&[DetentionRow], AppError> {
            self.detention_calls += 1;
            Ok(&self.rows)
        }

        fn encounters(&mut self) -> Result<&MonthlySeries, AppError> {
            Ok(&self.series)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::Fixture;
    use super::*;
    use crate::domain::{Authority, Display};

    #[test]
    fn dispatch_covers_every_selection() {
        let mut data = Fixture::new();
        let cases = [
            (ChartSelection::ArrestingAuthority(Display::Count), 3),
            (ChartSelection::ArrestingAuthority(Display::Percent), 2),
            (ChartSelection::Criminality(Display::Count, Authority::Cbp), 4),
            (ChartSelection::Criminality(Display::Percent, Authority::Ice), 3),
            (ChartSelection::Criminality(Display::Percent, Authority::All), 3),
            (ChartSelection::BorderPatrol, 1),
        ];
        for (selection, n_series) in cases {
            let chart = build_chart(selection, &mut data).unwrap();
            assert_eq!(chart.series.len(), n_series, "{selection:?}");
        }
        assert_eq!(data.detention_calls, 5);
    }

    #[test]
    fn percent_rounds_half_to_even() {
        assert_eq!(percent(1, 8), Some(12.0)); // 12.5
        assert_eq!(percent(3, 8), Some(38.0)); // 37.5
        assert_eq!(percent(2, 3), Some(67.0));
        assert_eq!(percent(5, 0), None);
    }

    #[test]
    fn long_rows_melt_series_in_legend_order() {
        let mut data = Fixture::new();
        let chart = build_chart(ChartSelection::ArrestingAuthority(Display::Count), &mut data).unwrap();
        let rows = chart.long_rows();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].series, "ICE");
        assert_eq!(rows[0].date, ymd(2025, 9, 7));
        assert_eq!(rows[5].series, "Total");
        assert_eq!(rows[5].value, 59000.0);
    }

    #[test]
    fn markers_outside_range_are_hidden() {
        let mut data = Fixture::new();
        let chart = build_chart(ChartSelection::BorderPatrol, &mut data).unwrap();
        assert_eq!(chart.visible_markers(), Vec::new());
        assert_eq!(chart.date_range(), Some((ymd(2024, 1, 1), ymd(2024, 12, 1))));
        assert_eq!(chart.max_y(), 12000.0);
    }
}
