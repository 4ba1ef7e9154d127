//! Border Patrol encounters chart.

use crate::chart::{AdministrationMarker, Chart, Series, ymd};
use crate::domain::MonthlySeries;

pub const ENCOUNTERS_TITLE: &str = "Border Patrol Encounters at the Southwest Land Border";

pub fn encounter_markers() -> Vec<AdministrationMarker> {
    vec![
        AdministrationMarker {
            president: "George W. Bush",
            start: ymd(2001, 1, 20),
        },
        AdministrationMarker {
            president: "Barack Obama",
            start: ymd(2009, 1, 20),
        },
        AdministrationMarker {
            president: "Donald Trump",
            start: ymd(2017, 1, 20),
        },
        AdministrationMarker {
            president: "Joe Biden",
            start: ymd(2021, 1, 20),
        },
        // Second Trump term: line only, no room for a label.
        AdministrationMarker {
            president: "",
            start: ymd(2025, 1, 20),
        },
    ]
}

pub fn encounters_chart(series: &MonthlySeries) -> Chart {
    let points = series
        .records()
        .iter()
        .map(|r| (r.date, r.encounters as f64))
        .collect();

    Chart {
        title: ENCOUNTERS_TITLE.to_string(),
        x_label: "Date",
        y_label: "Encounters",
        legend_title: "series",
        value_name: "encounters",
        series: vec![Series {
            name: "Encounters".to_string(),
            points,
        }],
        markers: encounter_markers(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MonthlyRecord;

    #[test]
    fn single_series_follows_merged_records() {
        let records = vec![
            MonthlyRecord { date: ymd(2024, 12, 1), encounters: 47_322 },
            MonthlyRecord { date: ymd(2025, 1, 1), encounters: 29_101 },
            MonthlyRecord { date: ymd(2025, 2, 1), encounters: 8_347 },
        ];
        let chart = encounters_chart(&MonthlySeries::try_from_records(records).unwrap());
        assert_eq!(chart.series_names(), vec!["Encounters"]);
        assert_eq!(chart.series[0].points[1], (ymd(2025, 1, 1), 29_101.0));
        assert_eq!(chart.max_y(), 47_322.0);

        let visible = chart.visible_markers();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].president, "");
    }
}
