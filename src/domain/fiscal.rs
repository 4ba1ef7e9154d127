//! U.S. federal fiscal-year date helpers.
//!
//! Fiscal year N runs from Oct 1 of calendar year N-1 through Sep 30 of N.
//! Source extracts label October–December rows with fiscal year N, so those
//! months have to be shifted back one calendar year before charting.

use chrono::{Datelike, NaiveDate};

/// Convert a fiscal-year-labeled date to its calendar date.
///
/// Only the month is inspected. October, November and December move back one
/// year with month/day untouched; every other month is returned as-is.
///
/// `None` only when the shifted year falls outside chrono's range.
pub fn fiscal_to_calendar(fiscal_date: NaiveDate) -> Option<NaiveDate> {
    if fiscal_date.month() >= 10 {
        fiscal_date.with_year(fiscal_date.year() - 1)
    } else {
        Some(fiscal_date)
    }
}

/// Last calendar day of fiscal year `fy` (Sep 30 of `fy`).
pub fn fiscal_year_end(fy: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(fy, 9, 30)
}

/// First day of the month following `date`'s month.
pub fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
}

/// Build the first-of-month date for a fiscal-year label and month name.
///
/// The result is still fiscal-labeled; pass it through [`fiscal_to_calendar`].
pub fn fiscal_month_date(fiscal_year: i32, month_label: &str) -> Option<NaiveDate> {
    let month = month_from_name(month_label)?;
    NaiveDate::from_ymd_opt(fiscal_year, month, 1)
}

/// Parse a month label into its number (1..=12).
///
/// Accepts full names, three-letter abbreviations in any case, and the
/// spreadsheet's numbered form (`"01 October"`).
pub fn month_from_name(label: &str) -> Option<u32> {
    let name = label
        .split_whitespace()
        .find(|tok| tok.chars().all(|c| c.is_ascii_alphabetic()))?;
    if name.len() < 3 {
        return None;
    }

    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];

    let lower = name.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|full| full.starts_with(&lower) && (lower.len() == 3 || lower.len() == full.len()))
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn only_october_through_december_shift_back_a_year() {
        for month in 1..=9 {
            assert_eq!(fiscal_to_calendar(ymd(2025, month, 1)), Some(ymd(2025, month, 1)));
        }
        for month in 10..=12 {
            assert_eq!(fiscal_to_calendar(ymd(2025, month, 1)), Some(ymd(2024, month, 1)));
        }
    }

    #[test]
    fn day_of_month_is_preserved() {
        assert_eq!(fiscal_to_calendar(ymd(2025, 10, 17)), Some(ymd(2024, 10, 17)));
        assert_eq!(fiscal_to_calendar(ymd(2025, 9, 30)), Some(ymd(2025, 9, 30)));
    }

    #[test]
    fn fiscal_year_end_is_september_30() {
        assert_eq!(fiscal_year_end(2024), Some(ymd(2024, 9, 30)));
    }

    #[test]
    fn out_of_range_year_has_no_calendar_date() {
        let earliest_october = ymd(NaiveDate::MIN.year(), 10, 1);
        assert_eq!(fiscal_to_calendar(earliest_october), None);
    }

    #[test]
    fn next_month_rolls_over_december() {
        assert_eq!(next_month(ymd(2024, 12, 1)), Some(ymd(2025, 1, 1)));
        assert_eq!(next_month(ymd(2024, 1, 31)), Some(ymd(2024, 2, 1)));
    }

    #[test]
    fn month_names_in_source_formats() {
        assert_eq!(month_from_name("01 October"), Some(10));
        assert_eq!(month_from_name("12 September"), Some(9));
        assert_eq!(month_from_name("OCT"), Some(10));
        assert_eq!(month_from_name("Feb"), Some(2));
        assert_eq!(month_from_name("december"), Some(12));
        assert_eq!(month_from_name("Octo"), None);
        assert_eq!(month_from_name("13"), None);
    }

    #[test]
    fn fiscal_month_date_then_convert() {
        let d = fiscal_month_date(2025, "NOV").unwrap();
        assert_eq!(d, ymd(2025, 11, 1));
        assert_eq!(fiscal_to_calendar(d), Some(ymd(2024, 11, 1)));
    }
}
