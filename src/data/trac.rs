//! TRAC "ICE Detainees" feed.
//!
//! The page at <https://tracreports.org/immigration/detentionstats/pop_agen_table.html>
//! is populated from a JSON array; each element is one snapshot date with the
//! twelve `{ice,cbp,total}_{all,conv,pend,other}` counts.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::{Deserialize, Deserializer};

use crate::config::Config;
use crate::domain::DetentionRow;
use crate::error::AppError;

pub struct TracClient {
    client: Client,
    url: String,
}

impl TracClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::Fetch(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: config.detentions_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and parse the full detention table.
    ///
    /// Failures are returned immediately; there is no retry.
    pub fn fetch_detentions(&self) -> Result<Vec<DetentionRow>, AppError> {
        tracing::info!(url = %self.url, "fetching detention data");

        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| AppError::Fetch(format!("TRAC request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::Fetch(format!(
                "TRAC request failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::Fetch(format!("Failed to read TRAC response: {e}")))?;

        let rows = parse_detentions(&body)?;
        tracing::info!(rows = rows.len(), "detention data loaded");
        Ok(rows)
    }
}

/// Parse the TRAC JSON array into rows, in feed order.
pub fn parse_detentions(body: &str) -> Result<Vec<DetentionRow>, AppError> {
    let raw: Vec<RawDetention> = serde_json::from_str(body)
        .map_err(|e| AppError::Parse(format!("Failed to parse TRAC response: {e}")))?;
    raw.into_iter().map(RawDetention::into_row).collect()
}

#[derive(Debug, Deserialize)]
struct RawDetention {
    date: String,
    #[serde(deserialize_with = "count")]
    ice_all: u64,
    #[serde(deserialize_with = "count")]
    ice_conv: u64,
    #[serde(deserialize_with = "count")]
    ice_pend: u64,
    #[serde(deserialize_with = "count")]
    ice_other: u64,
    #[serde(deserialize_with = "count")]
    cbp_all: u64,
    #[serde(deserialize_with = "count")]
    cbp_conv: u64,
    #[serde(deserialize_with = "count")]
    cbp_pend: u64,
    #[serde(deserialize_with = "count")]
    cbp_other: u64,
    #[serde(deserialize_with = "count")]
    total_all: u64,
    #[serde(deserialize_with = "count")]
    total_conv: u64,
    #[serde(deserialize_with = "count")]
    total_pend: u64,
    #[serde(deserialize_with = "count")]
    total_other: u64,
}

impl RawDetention {
    fn into_row(self) -> Result<DetentionRow, AppError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%m/%d/%Y")
            .map_err(|e| AppError::Parse(format!("Invalid TRAC date '{}': {e}", self.date)))?;
        Ok(DetentionRow {
            date,
            ice_all: self.ice_all,
            ice_conv: self.ice_conv,
            ice_pend: self.ice_pend,
            ice_other: self.ice_other,
            cbp_all: self.cbp_all,
            cbp_conv: self.cbp_conv,
            cbp_pend: self.cbp_pend,
            cbp_other: self.cbp_other,
            total_all: self.total_all,
            total_conv: self.total_conv,
            total_pend: self.total_pend,
            total_other: self.total_other,
        })
    }
}

/// Counts arrive as JSON numbers or as strings like `"61,226"`.
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrText {
        Int(u64),
        Float(f64),
        Text(String),
    }

    match NumOrText::deserialize(deserializer)? {
        NumOrText::Int(v) => Ok(v),
        NumOrText::Float(v) if v.is_finite() && v >= 0.0 => Ok(v.round() as u64),
        NumOrText::Float(v) => Err(serde::de::Error::custom(format!("invalid count {v}"))),
        NumOrText::Text(s) => parse_count(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid count '{s}'"))),
    }
}

/// Parse a non-negative integer that may contain thousands separators.
pub(crate) fn parse_count(raw: &str) -> Option<u64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"[
        {"date": "09/21/2025", "ice_all": 40000, "ice_conv": 12000, "ice_pend": 9000, "ice_other": 19000,
         "cbp_all": 19000, "cbp_conv": 4000, "cbp_pend": 3000, "cbp_other": 12000,
         "total_all": 59000, "total_conv": 16000, "total_pend": 12000, "total_other": 31000},
        {"date": "09/07/2025", "ice_all": "39,500", "ice_conv": "11,800", "ice_pend": "8,900", "ice_other": "18,800",
         "cbp_all": "19,700", "cbp_conv": "4,100", "cbp_pend": "3,200", "cbp_other": "12,400",
         "total_all": "59,200", "total_conv": "15,900", "total_pend": "12,100", "total_other": "31,200",
         "extra_field": "ignored"}
    ]"#;

    #[test]
    fn parses_numbers_and_separated_strings() {
        let rows = parse_detentions(FIXTURE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2025, 9, 21).unwrap());
        assert_eq!(rows[0].total_all, 59000);
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2025, 9, 7).unwrap());
        assert_eq!(rows[1].ice_all, 39500);
        assert_eq!(rows[1].total_other, 31200);
    }

    #[test]
    fn bad_date_is_a_parse_error() {
        let body = FIXTURE.replace("09/21/2025", "2025-09-21");
        let err = parse_detentions(&body).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
        assert!(err.to_string().contains("2025-09-21"));
    }

    #[test]
    fn missing_column_is_a_parse_error() {
        let err = parse_detentions(r#"[{"date": "09/21/2025", "ice_all": 1}]"#).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn parse_count_handles_separators() {
        assert_eq!(parse_count(" 1,234,567 "), Some(1_234_567));
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("-3"), None);
    }
}
