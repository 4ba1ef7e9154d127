//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - built from the source extracts
//! - handed to chart construction
//! - exported to CSV

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::fiscal::next_month;
use crate::error::AppError;

/// One month of encounters (first-of-month calendar date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub date: NaiveDate,
    pub encounters: u64,
}

/// A gap-free, duplicate-free monthly series ordered by date.
///
/// The only way to get one is [`MonthlySeries::try_from_records`], which
/// enforces the invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySeries {
    records: Vec<MonthlyRecord>,
}

impl MonthlySeries {
    /// Validate and sort `records` into a series.
    ///
    /// Fails with [`AppError::Integrity`] when the dates repeat, skip a month,
    /// are not first-of-month, or when there are no records at all.
    pub fn try_from_records(mut records: Vec<MonthlyRecord>) -> Result<Self, AppError> {
        records.sort_by_key(|r| r.date);

        let (Some(first), Some(last)) = (records.first(), records.last()) else {
            return Err(AppError::Integrity("merged series is empty".to_string()));
        };

        if let Some(bad) = records.iter().find(|r| r.date.day() != 1) {
            return Err(AppError::Integrity(format!(
                "date {} is not the first of a month",
                bad.date
            )));
        }

        let unique: BTreeSet<NaiveDate> = records.iter().map(|r| r.date).collect();
        if unique.len() != records.len() {
            let dupes: Vec<String> = records
                .windows(2)
                .filter(|w| w[0].date == w[1].date)
                .map(|w| w[0].date.to_string())
                .collect();
            return Err(AppError::Integrity(format!(
                "duplicate months in merged series: {}",
                dupes.join(", ")
            )));
        }

        let mut expected = Vec::with_capacity(records.len());
        let mut cursor = first.date;
        while cursor <= last.date {
            expected.push(cursor);
            cursor = next_month(cursor).ok_or_else(|| {
                AppError::Integrity(format!("month after {cursor} is out of range"))
            })?;
        }

        if expected.len() != unique.len() {
            let missing: Vec<String> = expected
                .iter()
                .filter(|d| !unique.contains(d))
                .map(|d| d.to_string())
                .collect();
            return Err(AppError::Integrity(format!(
                "missing months between {} and {}: {}",
                first.date,
                last.date,
                missing.join(", ")
            )));
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[MonthlyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }
}

/// Arresting authority as shown in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Authority {
    All,
    Ice,
    Cbp,
}

impl Authority {
    pub const ALL: [Authority; 3] = [Authority::All, Authority::Ice, Authority::Cbp];

    pub fn label(self) -> &'static str {
        match self {
            Authority::All => "All",
            Authority::Ice => "ICE",
            Authority::Cbp => "CBP",
        }
    }

    /// Column prefix in the detention table (`ice`, `cbp`, `total`).
    pub fn column_prefix(self) -> &'static str {
        match self {
            Authority::All => "total",
            Authority::Ice => "ice",
            Authority::Cbp => "cbp",
        }
    }
}

impl FromStr for Authority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Authority::ALL
            .into_iter()
            .find(|a| a.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::InvalidSelection(format!("Unknown authority {s}")))
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Criminal status breakdown within one authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    All,
    Convicted,
    Pending,
    Other,
}

impl Status {
    pub fn column_suffix(self) -> &'static str {
        match self {
            Status::All => "all",
            Status::Convicted => "conv",
            Status::Pending => "pend",
            Status::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::All => "Total",
            Status::Convicted => "Convicted Criminal",
            Status::Pending => "Pending Criminal Charges",
            Status::Other => "Other Immigration Violator",
        }
    }
}

/// One snapshot row of the TRAC detention table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetentionRow {
    pub date: NaiveDate,
    pub ice_all: u64,
    pub ice_conv: u64,
    pub ice_pend: u64,
    pub ice_other: u64,
    pub cbp_all: u64,
    pub cbp_conv: u64,
    pub cbp_pend: u64,
    pub cbp_other: u64,
    pub total_all: u64,
    pub total_conv: u64,
    pub total_pend: u64,
    pub total_other: u64,
}

impl DetentionRow {
    /// Column names in table order, `date` first.
    pub const COLUMNS: [&'static str; 13] = [
        "date",
        "ice_all",
        "ice_conv",
        "ice_pend",
        "ice_other",
        "cbp_all",
        "cbp_conv",
        "cbp_pend",
        "cbp_other",
        "total_all",
        "total_conv",
        "total_pend",
        "total_other",
    ];

    /// Value of the `{authority}_{status}` column.
    pub fn value(&self, authority: Authority, status: Status) -> u64 {
        match (authority, status) {
            (Authority::Ice, Status::All) => self.ice_all,
            (Authority::Ice, Status::Convicted) => self.ice_conv,
            (Authority::Ice, Status::Pending) => self.ice_pend,
            (Authority::Ice, Status::Other) => self.ice_other,
            (Authority::Cbp, Status::All) => self.cbp_all,
            (Authority::Cbp, Status::Convicted) => self.cbp_conv,
            (Authority::Cbp, Status::Pending) => self.cbp_pend,
            (Authority::Cbp, Status::Other) => self.cbp_other,
            (Authority::All, Status::All) => self.total_all,
            (Authority::All, Status::Convicted) => self.total_conv,
            (Authority::All, Status::Pending) => self.total_pend,
            (Authority::All, Status::Other) => self.total_other,
        }
    }
}

/// Which family of charts to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dataset {
    ArrestingAuthority,
    Criminality,
    BorderPatrol,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [
        Dataset::ArrestingAuthority,
        Dataset::Criminality,
        Dataset::BorderPatrol,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dataset::ArrestingAuthority => "Arresting Authority",
            Dataset::Criminality => "Criminality",
            Dataset::BorderPatrol => "Border Patrol",
        }
    }
}

impl FromStr for Dataset {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Dataset::ALL
            .into_iter()
            .find(|d| normalize_label(d.label()) == wanted)
            .ok_or_else(|| AppError::InvalidSelection(format!("Unknown dataset {s}")))
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Count vs percent display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Display {
    Count,
    Percent,
}

impl Display {
    pub const ALL: [Display; 2] = [Display::Count, Display::Percent];

    pub fn label(self) -> &'static str {
        match self {
            Display::Count => "Count",
            Display::Percent => "Percent",
        }
    }
}

impl FromStr for Display {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Display::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::InvalidSelection(format!("Unknown display {s}")))
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fully-specified chart request.
///
/// Only valid combinations can be expressed, so chart dispatch is an
/// exhaustive match with no fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartSelection {
    ArrestingAuthority(Display),
    Criminality(Display, Authority),
    BorderPatrol,
}

impl ChartSelection {
    /// Build a selection from loosely-typed UI/CLI parts.
    ///
    /// `display` is required for the detention datasets and `authority` for
    /// Criminality; extras are ignored, as the UI only shows the relevant
    /// selectors.
    pub fn from_parts(
        dataset: Dataset,
        display: Option<Display>,
        authority: Option<Authority>,
    ) -> Result<Self, AppError> {
        let need_display = || {
            display.ok_or_else(|| {
                AppError::InvalidSelection(format!(
                    "Cannot create graph for dataset={dataset}, display=None"
                ))
            })
        };

        match dataset {
            Dataset::ArrestingAuthority => Ok(ChartSelection::ArrestingAuthority(need_display()?)),
            Dataset::Criminality => {
                let display = need_display()?;
                let authority = authority.ok_or_else(|| {
                    AppError::InvalidSelection(
                        "Authority must be specified for Criminality dataset".to_string(),
                    )
                })?;
                Ok(ChartSelection::Criminality(display, authority))
            }
            Dataset::BorderPatrol => Ok(ChartSelection::BorderPatrol),
        }
    }

    pub fn dataset(self) -> Dataset {
        match self {
            ChartSelection::ArrestingAuthority(_) => Dataset::ArrestingAuthority,
            ChartSelection::Criminality(..) => Dataset::Criminality,
            ChartSelection::BorderPatrol => Dataset::BorderPatrol,
        }
    }
}

fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
