//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded first if
//! present), then CLI flags override individual fields in `app`.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_DETENTIONS_URL: &str =
    "https://tracreports.org/immigration/detentionstats/pop_agen_table.json";
pub const DEFAULT_HISTORIC_PATH: &str = "data/KHSM Encounters (USBP) fy25m11.xlsx";
pub const DEFAULT_HISTORIC_SHEET: &str = "Monthly Region";
pub const DEFAULT_YTD_PATH: &str = "data/sbo_encounters_fy22_fy25.csv";
pub const DEFAULT_REGION: &str = "Southwest Land Border";
pub const DEFAULT_HISTORIC_CUTOFF_FY: i32 = 2024;
pub const DEFAULT_YTD_FISCAL_YEAR: &str = "2025 (FYTD)";
pub const DEFAULT_YTD_COMPONENT: &str = "U.S. Border Patrol";

/// TRAC updates the page a few times a month, so 15 minutes is plenty.
pub const DEFAULT_DETENTIONS_TTL: Duration = Duration::from_secs(15 * 60);
/// The encounter extracts are local files; re-read at most once a day.
pub const DEFAULT_ENCOUNTERS_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub detentions_url: String,
    /// OHSS workbook (`.xlsx`/`.xls`/`.ods`) or a CSV export of its sheet.
    pub historic_path: PathBuf,
    /// Worksheet read when `historic_path` is a workbook.
    pub historic_sheet: String,
    pub ytd_path: PathBuf,
    /// Region kept from the historic extract.
    pub region: String,
    /// Historic rows are kept through Sep 30 of this fiscal year.
    pub historic_cutoff_fy: i32,
    /// Exact "Fiscal Year" label selected from the year-to-date extract.
    pub ytd_fiscal_year: String,
    /// Exact "Component" selected from the year-to-date extract.
    pub ytd_component: String,
    pub detentions_ttl: Duration,
    pub encounters_ttl: Duration,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detentions_url: DEFAULT_DETENTIONS_URL.to_string(),
            historic_path: PathBuf::from(DEFAULT_HISTORIC_PATH),
            historic_sheet: DEFAULT_HISTORIC_SHEET.to_string(),
            ytd_path: PathBuf::from(DEFAULT_YTD_PATH),
            region: DEFAULT_REGION.to_string(),
            historic_cutoff_fy: DEFAULT_HISTORIC_CUTOFF_FY,
            ytd_fiscal_year: DEFAULT_YTD_FISCAL_YEAR.to_string(),
            ytd_component: DEFAULT_YTD_COMPONENT.to_string(),
            detentions_ttl: DEFAULT_DETENTIONS_TTL,
            encounters_ttl: DEFAULT_ENCOUNTERS_TTL,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl Config {
    /// Load `.env` (if any) and read `IE_*` variables over the defaults.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(v) = lookup("IE_DETENTIONS_URL") {
            config.detentions_url = v;
        }
        if let Some(v) = lookup("IE_HISTORIC_PATH") {
            config.historic_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("IE_HISTORIC_SHEET") {
            config.historic_sheet = v;
        }
        if let Some(v) = lookup("IE_YTD_PATH") {
            config.ytd_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("IE_REGION") {
            config.region = v;
        }
        if let Some(v) = lookup("IE_HISTORIC_CUTOFF_FY") {
            config.historic_cutoff_fy = parse_number("IE_HISTORIC_CUTOFF_FY", &v)?;
        }
        if let Some(v) = lookup("IE_YTD_FISCAL_YEAR") {
            config.ytd_fiscal_year = v;
        }
        if let Some(v) = lookup("IE_YTD_COMPONENT") {
            config.ytd_component = v;
        }
        if let Some(v) = lookup("IE_DETENTIONS_TTL_SECS") {
            config.detentions_ttl = Duration::from_secs(parse_number("IE_DETENTIONS_TTL_SECS", &v)?);
        }
        if let Some(v) = lookup("IE_ENCOUNTERS_TTL_SECS") {
            config.encounters_ttl = Duration::from_secs(parse_number("IE_ENCOUNTERS_TTL_SECS", &v)?);
        }
        if let Some(v) = lookup("IE_HTTP_TIMEOUT_SECS") {
            config.http_timeout = Duration::from_secs(parse_number("IE_HTTP_TIMEOUT_SECS", &v)?);
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| AppError::Config(format!("{key}='{raw}' is not a valid number: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.detentions_ttl, Duration::from_secs(900));
        assert_eq!(config.region, "Southwest Land Border");
        assert_eq!(config.historic_sheet, "Monthly Region");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("IE_HISTORIC_CUTOFF_FY", "2025"),
            ("IE_YTD_FISCAL_YEAR", "2026 (FYTD)"),
            ("IE_ENCOUNTERS_TTL_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(config.historic_cutoff_fy, 2025);
        assert_eq!(config.ytd_fiscal_year, "2026 (FYTD)");
        assert_eq!(config.encounters_ttl, Duration::from_secs(60));
    }

    #[test]
    fn bad_number_is_a_config_error() {
        let err = Config::from_lookup(lookup_from(&[("IE_HTTP_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("IE_HTTP_TIMEOUT_SECS"));
    }
}
