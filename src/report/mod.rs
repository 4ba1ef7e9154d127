//! Terminal text output: table summaries for the CLI subcommands.
//!
//! We keep formatting code in one place so output changes are localized.

use crate::domain::{DetentionRow, MonthlySeries};

/// Summary header plus one line per month.
pub fn format_encounters(series: &MonthlySeries) -> String {
    let mut out = String::new();
    out.push_str("=== Border Patrol Encounters: Southwest Land Border ===\n");
    if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
        out.push_str(&format!("Months: {} | {first} .. {last}\n", series.len()));
    }
    if let Some(peak) = series.records().iter().max_by_key(|r| r.encounters) {
        out.push_str(&format!("Peak: {} ({})\n", group_thousands(peak.encounters), peak.date));
    }
    out.push('\n');
    out.push_str(&format!("{:<10}  {:>12}\n", "date", "encounters"));
    for r in series.records() {
        out.push_str(&format!("{:<10}  {:>12}\n", r.date.to_string(), group_thousands(r.encounters)));
    }
    out
}

/// Raw detention table, newest first as TRAC lists it.
pub fn format_detentions(rows: &[DetentionRow]) -> String {
    let mut out = String::new();
    out.push_str("=== ICE Detainees (TRAC) ===\n");
    out.push_str(&format!("Snapshots: {}\n\n", rows.len()));

    let header: Vec<String> = DetentionRow::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| if i == 0 { format!("{c:<10}") } else { format!("{c:>11}") })
        .collect();
    out.push_str(header.join(" ").trim_end());
    out.push('\n');

    for r in rows {
        let values = [
            r.ice_all, r.ice_conv, r.ice_pend, r.ice_other, r.cbp_all, r.cbp_conv, r.cbp_pend,
            r.cbp_other, r.total_all, r.total_conv, r.total_pend, r.total_other,
        ];
        let mut line = format!("{:<10}", r.date.format("%m/%d/%Y").to_string());
        for v in values {
            line.push_str(&format!(" {:>11}", group_thousands(v)));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(v: u64) -> String {
    let digits = v.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::fixtures::Fixture;

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn encounters_summary_reports_span_and_peak() {
        let series = Fixture::new().series;
        let text = format_encounters(&series);
        assert!(text.contains("Months: 12 | 2024-01-01 .. 2024-12-01"));
        assert!(text.contains("Peak: 12,000 (2024-12-01)"));
    }

    #[test]
    fn detentions_table_keeps_feed_order() {
        let rows = Fixture::new().rows;
        let text = format_detentions(&rows);
        let first = text.find("09/21/2025").unwrap();
        let second = text.find("09/07/2025").unwrap();
        assert!(first < second);
        assert!(text.contains("59,000"));
    }
}
