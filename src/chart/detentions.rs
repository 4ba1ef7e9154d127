//! Charts over the TRAC detention table.

use crate::chart::{AdministrationMarker, Chart, Series, percent, ymd};
use crate::domain::{Authority, DetentionRow, Status};

pub const AA_TITLE: &str = "ICE Detainees by Date* and Arresting Authority";
pub const AA_LEGEND: &str = "Arresting Authority";
pub const CRIMINALITY_LEGEND: &str = "Criminal Status";

const STATUS_BREAKDOWN: [Status; 3] = [Status::Convicted, Status::Pending, Status::Other];

pub fn detention_markers() -> Vec<AdministrationMarker> {
    vec![
        AdministrationMarker {
            president: "Joe Biden",
            start: ymd(2021, 1, 20),
        },
        AdministrationMarker {
            president: "Donald Trump",
            start: ymd(2025, 1, 20),
        },
    ]
}

/// Detainees by arresting authority: ICE, CBP and Total counts.
pub fn aa_count_chart(rows: &[DetentionRow]) -> Chart {
    let series = [
        ("ICE", Authority::Ice),
        ("CBP", Authority::Cbp),
        ("Total", Authority::All),
    ]
    .into_iter()
    .map(|(name, authority)| count_series(name, rows, |r| r.value(authority, Status::All)))
    .collect();

    detention_chart(AA_TITLE.to_string(), "Detainees", AA_LEGEND, "count", series)
}

/// Share of detainees held by ICE and CBP arrests.
pub fn aa_pct_chart(rows: &[DetentionRow]) -> Chart {
    let series = [("ICE", Authority::Ice), ("CBP", Authority::Cbp)]
        .into_iter()
        .map(|(name, authority)| {
            pct_series(name, rows, |r| {
                percent(r.value(authority, Status::All), r.value(Authority::All, Status::All))
            })
        })
        .collect();

    detention_chart(AA_TITLE.to_string(), "Percent", AA_LEGEND, "percent", series)
}

/// Criminal status counts for one authority, plus its total.
pub fn criminality_count_chart(rows: &[DetentionRow], authority: Authority) -> Chart {
    let series = STATUS_BREAKDOWN
        .into_iter()
        .chain([Status::All])
        .map(|status| count_series(status.label(), rows, |r| r.value(authority, status)))
        .collect();

    detention_chart(
        criminality_chart_title(authority),
        "Detainees",
        CRIMINALITY_LEGEND,
        "count",
        series,
    )
}

/// Criminal status as a share of the authority's total.
pub fn criminality_pct_chart(rows: &[DetentionRow], authority: Authority) -> Chart {
    let series = STATUS_BREAKDOWN
        .into_iter()
        .map(|status| {
            pct_series(status.label(), rows, |r| {
                percent(r.value(authority, status), r.value(authority, Status::All))
            })
        })
        .collect();

    detention_chart(
        criminality_chart_title(authority),
        "Percent",
        CRIMINALITY_LEGEND,
        "percent",
        series,
    )
}

pub fn criminality_chart_title(authority: Authority) -> String {
    match authority {
        Authority::All => "ICE Detainees by Date* and Criminality**".to_string(),
        Authority::Ice | Authority::Cbp => format!(
            "ICE Detainees (Detained by {}) by Date* and Criminality**",
            authority.label()
        ),
    }
}

fn detention_chart(
    title: String,
    y_label: &'static str,
    legend_title: &'static str,
    value_name: &'static str,
    series: Vec<Series>,
) -> Chart {
    Chart {
        title,
        x_label: "Date",
        y_label,
        legend_title,
        value_name,
        series,
        markers: detention_markers(),
    }
}

fn count_series(name: &str, rows: &[DetentionRow], value: impl Fn(&DetentionRow) -> u64) -> Series {
    pct_series(name, rows, |r| Some(value(r) as f64))
}

/// Rows whose value is `None` (zero denominator) are left out of the line.
fn pct_series(name: &str, rows: &[DetentionRow], value: impl Fn(&DetentionRow) -> Option<f64>) -> Series {
    let mut points: Vec<_> = rows
        .iter()
        .filter_map(|r| value(r).map(|v| (r.date, v)))
        .collect();
    points.sort_by_key(|&(date, _)| date);
    Series {
        name: name.to_string(),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::fixtures::Fixture;

    #[test]
    fn aa_count_has_ice_cbp_total() {
        let rows = Fixture::new().rows;
        let chart = aa_count_chart(&rows);
        assert_eq!(chart.series_names(), vec!["ICE", "CBP", "Total"]);
        assert_eq!(chart.y_label, "Detainees");
        assert_eq!(chart.legend_title, "Arresting Authority");

        let ice = chart.series("ICE").unwrap();
        assert_eq!(
            ice.points,
            vec![(ymd(2025, 9, 7), 39500.0), (ymd(2025, 9, 21), 41000.0)]
        );
    }

    #[test]
    fn aa_percent_has_ice_and_cbp_only() {
        let rows = Fixture::new().rows;
        let chart = aa_pct_chart(&rows);
        assert_eq!(chart.series_names(), vec!["ICE", "CBP"]);
        assert_eq!(chart.value_name, "percent");

        for row in &rows {
            let expected_ice = (row.ice_all as f64 / row.total_all as f64 * 100.0).round();
            let expected_cbp = (row.cbp_all as f64 / row.total_all as f64 * 100.0).round();
            let ice = chart.series("ICE").unwrap().points.iter().find(|p| p.0 == row.date).unwrap();
            let cbp = chart.series("CBP").unwrap().points.iter().find(|p| p.0 == row.date).unwrap();
            assert_eq!(ice.1, expected_ice);
            assert_eq!(cbp.1, expected_cbp);
        }
    }

    #[test]
    fn criminality_uses_authority_columns() {
        let rows = Fixture::new().rows;
        let chart = criminality_count_chart(&rows, Authority::Cbp);
        assert_eq!(
            chart.series_names(),
            vec![
                "Convicted Criminal",
                "Pending Criminal Charges",
                "Other Immigration Violator",
                "Total"
            ]
        );
        let conv = chart.series("Convicted Criminal").unwrap();
        assert_eq!(conv.points.last(), Some(&(ymd(2025, 9, 21), 4000.0)));
    }

    #[test]
    fn criminality_percent_divides_by_authority_total() {
        let rows = Fixture::new().rows;
        let chart = criminality_pct_chart(&rows, Authority::All);
        assert_eq!(chart.series.len(), 3);
        let other = chart.series("Other Immigration Violator").unwrap();
        // 31000 / 59000 = 52.54%
        assert_eq!(other.points.last(), Some(&(ymd(2025, 9, 21), 53.0)));
    }

    #[test]
    fn zero_total_drops_the_point() {
        let mut rows = Fixture::new().rows;
        rows[0].cbp_all = 0;
        let chart = criminality_pct_chart(&rows, Authority::Cbp);
        assert!(chart.series.iter().all(|s| s.points.len() == 1));
    }

    #[test]
    fn criminality_titles() {
        assert_eq!(
            criminality_chart_title(Authority::All),
            "ICE Detainees by Date* and Criminality**"
        );
        assert_eq!(
            criminality_chart_title(Authority::Ice),
            "ICE Detainees (Detained by ICE) by Date* and Criminality**"
        );
    }
}
