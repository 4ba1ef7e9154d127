use std::path::PathBuf;

use chrono::NaiveDate;

use immigration_enforcement::app::pipeline::Dashboard;
use immigration_enforcement::config::Config;
use immigration_enforcement::data::sw_border_encounters;
use immigration_enforcement::domain::{ChartSelection, next_month};
use immigration_enforcement::error::AppError;

const MONTHS: [&str; 12] = [
    "01 October",
    "02 November",
    "03 December",
    "04 January",
    "05 February",
    "06 March",
    "07 April",
    "08 May",
    "09 June",
    "10 July",
    "11 August",
    "12 September",
];

fn historic_csv() -> String {
    let mut body = String::from("Fiscal Year,Month,Region,Quantity\n");
    for (idx, month) in MONTHS.iter().enumerate() {
        body.push_str(&format!("2024,{month},Southwest Land Border,\"1,{:03}\"\n", idx + 1));
        body.push_str(&format!("2024,{month},Coastal Border,5\n"));
    }
    // Past the cutoff; the year-to-date file covers these months.
    body.push_str("2025,01 October,Southwest Land Border,999999\n");
    body
}

fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn config(dir: &tempfile::TempDir, ytd: &str) -> Config {
    Config {
        historic_path: write(dir, "historic.csv", &historic_csv()),
        ytd_path: write(dir, "ytd.csv", ytd),
        detentions_url: "http://127.0.0.1:9/pop_agen_table.json".to_string(),
        ..Config::default()
    }
}

fn d(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

#[test]
fn historic_and_year_to_date_join_without_gaps() {
    let dir = tempfile::tempdir().unwrap();
    let ytd = "Fiscal Year,Month (abbv),Component,Encounter Count\n\
2025 (FYTD),OCT,U.S. Border Patrol,700\n\
2025 (FYTD),OCT,U.S. Border Patrol,300\n\
2025 (FYTD),NOV,U.S. Border Patrol,900\n\
2025 (FYTD),NOV,Office of Field Operations,50\n\
2025 (FYTD),DEC,U.S. Border Patrol,800\n";
    let series = sw_border_encounters(&config(&dir, ytd)).unwrap();

    assert_eq!(series.len(), 15);
    assert_eq!(series.first_date(), Some(d(2023, 10)));
    assert_eq!(series.last_date(), Some(d(2024, 12)));

    let records = series.records();
    for pair in records.windows(2) {
        assert_eq!(next_month(pair[0].date), Some(pair[1].date));
    }

    // Historic September 2024 is the last closed month, then the YTD file takes over.
    assert_eq!(records[11].date, d(2024, 9));
    assert_eq!(records[11].encounters, 1_012);
    assert_eq!(records[12].date, d(2024, 10));
    assert_eq!(records[12].encounters, 1_000);
    assert_eq!(records[13].encounters, 900);
}

#[test]
fn missing_year_to_date_month_is_an_integrity_error() {
    let dir = tempfile::tempdir().unwrap();
    let ytd = "Fiscal Year,Month (abbv),Component,Encounter Count\n\
2025 (FYTD),OCT,U.S. Border Patrol,700\n\
2025 (FYTD),DEC,U.S. Border Patrol,800\n";
    let err = sw_border_encounters(&config(&dir, ytd)).unwrap_err();
    assert!(matches!(err, AppError::Integrity(_)));
    assert_eq!(err.exit_code(), 5);
    assert!(err.to_string().contains("2024-11-01"));
}

#[test]
fn border_patrol_chart_comes_from_the_merged_series() {
    let dir = tempfile::tempdir().unwrap();
    let ytd = "Fiscal Year,Month (abbv),Component,Encounter Count\n\
2025 (FYTD),OCT,U.S. Border Patrol,1000\n";
    let mut dash = Dashboard::new(config(&dir, ytd)).unwrap();

    let chart = dash.chart(ChartSelection::BorderPatrol).unwrap();
    assert_eq!(chart.series.len(), 1);
    assert_eq!(chart.series[0].points.len(), 13);
    assert_eq!(chart.date_range(), Some((d(2023, 10), d(2024, 10))));
}
