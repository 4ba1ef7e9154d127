//! U.S. Border Patrol encounters at the Southwest Land Border.
//!
//! Two DHS extracts are combined:
//!
//! - the OHSS "CBP Encounters - USBP" workbook, "Monthly Region" sheet, read
//!   directly or from a CSV export of that sheet. Monthly data from October
//!   FY2000 onward, all three regions. Only the configured region is kept,
//!   and only through the last closed fiscal year so it cannot overlap the
//!   year-to-date file.
//! - the CBP "Southwest Land Border Encounters" CSV. Several rows per month
//!   (one per demographic breakdown); only the current fiscal-year-to-date
//!   label for one component is used, summed per month.
//!
//! Both label October–December with the following fiscal year, so every date
//! goes through [`fiscal_to_calendar`] before the merge.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::NaiveDate;
use csv::StringRecord;

use crate::config::Config;
use crate::data::trac::parse_count;
use crate::domain::{MonthlyRecord, MonthlySeries, fiscal_month_date, fiscal_to_calendar, fiscal_year_end};
use crate::error::AppError;

/// Load both extracts and merge them into one checked monthly series.
pub fn sw_border_encounters(config: &Config) -> Result<MonthlySeries, AppError> {
    let historic = load_historic(&config.historic_path, config)?;
    let ytd = load_ytd(&config.ytd_path, config)?;
    merge_monthly(historic, ytd)
}

/// Concatenate historic and year-to-date rows and validate the result.
///
/// Any duplicate or missing month is an [`AppError::Integrity`]; that means
/// one of the upstream files changed shape and must be looked at by hand.
pub fn merge_monthly(
    historic: Vec<MonthlyRecord>,
    ytd: Vec<MonthlyRecord>,
) -> Result<MonthlySeries, AppError> {
    let (n_hist, n_ytd) = (historic.len(), ytd.len());
    let mut all = historic;
    all.extend(ytd);

    match MonthlySeries::try_from_records(all) {
        Ok(series) => {
            tracing::info!(
                historic = n_hist,
                ytd = n_ytd,
                first = ?series.first_date(),
                last = ?series.last_date(),
                "merged encounter series"
            );
            Ok(series)
        }
        Err(err) => {
            tracing::error!(historic = n_hist, ytd = n_ytd, %err, "encounter merge failed");
            Err(err)
        }
    }
}

/// Load the historic extract, reading the configured sheet when `path` is a
/// workbook and treating anything else as a CSV export of that sheet.
pub fn load_historic(path: &Path, config: &Config) -> Result<Vec<MonthlyRecord>, AppError> {
    if is_workbook(path) {
        return read_historic_workbook(path, &config.historic_sheet, &config.region, config.historic_cutoff_fy);
    }
    let file = open(path, "historic encounters")?;
    read_historic(file, &config.region, config.historic_cutoff_fy)
}

pub fn load_ytd(path: &Path, config: &Config) -> Result<Vec<MonthlyRecord>, AppError> {
    let file = open(path, "year-to-date encounters")?;
    read_ytd(file, &config.ytd_fiscal_year, &config.ytd_component)
}

/// Read a CSV export of the "Monthly Region" sheet.
///
/// Keeps rows of `region`, converts fiscal dates, and drops anything after
/// Sep 30 of `cutoff_fy`.
pub fn read_historic<R: Read>(
    reader: R,
    region: &str,
    cutoff_fy: i32,
) -> Result<Vec<MonthlyRecord>, AppError> {
    let mut reader = csv_reader(reader);
    let headers = read_headers(&mut reader)?;
    let rows = reader.records().enumerate().map(|(idx, result)| {
        let line = idx + 2;
        result
            .map(|record| (line, record.iter().map(str::to_string).collect::<Vec<_>>()))
            .map_err(|e| AppError::Parse(format!("historic line {line}: {e}")))
    });
    historic_rows(&headers, rows, region, cutoff_fy)
}

/// Read the `sheet` worksheet of the OHSS workbook at `path`.
pub fn read_historic_workbook(
    path: &Path,
    sheet: &str,
    region: &str,
    cutoff_fy: i32,
) -> Result<Vec<MonthlyRecord>, AppError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        AppError::Io(format!("Failed to open historic workbook '{}': {e}", path.display()))
    })?;
    let range = workbook.worksheet_range(sheet).map_err(|e| {
        AppError::Parse(format!("historic workbook '{}' sheet '{sheet}': {e}", path.display()))
    })?;
    read_historic_range(&range, region, cutoff_fy)
}

/// Same as [`read_historic`], over an already-loaded worksheet. The first
/// row of the used range is the header.
pub fn read_historic_range(
    range: &Range<Data>,
    region: &str,
    cutoff_fy: i32,
) -> Result<Vec<MonthlyRecord>, AppError> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| AppError::Parse("historic sheet is empty".to_string()))?;
    let headers = header_map(header.iter().map(cell_text));
    let rows = rows
        .enumerate()
        .map(|(idx, row)| Ok::<_, AppError>((idx + 2, row.iter().map(cell_text).collect::<Vec<_>>())));
    historic_rows(&headers, rows, region, cutoff_fy)
}

/// Shared row logic for both historic sources. Quantities are only parsed
/// for rows that survive the region and cutoff filters; the open fiscal
/// year may have months that are not reported yet.
fn historic_rows<I>(
    headers: &HashMap<String, usize>,
    rows: I,
    region: &str,
    cutoff_fy: i32,
) -> Result<Vec<MonthlyRecord>, AppError>
where
    I: IntoIterator<Item = Result<(usize, Vec<String>), AppError>>,
{
    let last_date = fiscal_year_end(cutoff_fy)
        .ok_or_else(|| AppError::Config(format!("Invalid historic cutoff fiscal year {cutoff_fy}")))?;

    let col = |name: &str| column(headers, name, "historic");
    let (fy_idx, month_idx, region_idx, qty_idx) =
        (col("fiscal_year")?, col("month")?, col("region")?, col("quantity")?);

    let mut out = Vec::new();
    for row in rows {
        let (line, row) = row?;
        if cell(&row, region_idx) != region.trim() {
            continue;
        }

        let fiscal_year = parse_fiscal_year(cell(&row, fy_idx))
            .ok_or_else(|| row_error("historic", line, "fiscal year", cell(&row, fy_idx)))?;
        let month = cell(&row, month_idx);
        let date = fiscal_month_date(fiscal_year, month)
            .and_then(fiscal_to_calendar)
            .ok_or_else(|| row_error("historic", line, "month", month))?;
        if date > last_date {
            continue;
        }

        let encounters = parse_quantity(cell(&row, qty_idx))
            .ok_or_else(|| row_error("historic", line, "quantity", cell(&row, qty_idx)))?;
        out.push(MonthlyRecord { date, encounters });
    }

    out.sort_by_key(|r| r.date);
    tracing::debug!(rows = out.len(), region, cutoff_fy, "historic encounters loaded");
    Ok(out)
}

/// Read the year-to-date extract and sum rows per month.
pub fn read_ytd<R: Read>(
    reader: R,
    fiscal_year_label: &str,
    component: &str,
) -> Result<Vec<MonthlyRecord>, AppError> {
    // "2025 (FYTD)" -> 2025
    let fiscal_year = fiscal_year_label
        .split_whitespace()
        .next()
        .and_then(parse_fiscal_year)
        .ok_or_else(|| {
            AppError::Config(format!("Cannot read a fiscal year from label '{fiscal_year_label}'"))
        })?;

    let mut reader = csv_reader(reader);
    let headers = read_headers(&mut reader)?;
    let col = |name: &str| column(&headers, name, "year-to-date");
    let (fy_idx, component_idx, month_idx, count_idx) = (
        col("fiscal_year")?,
        col("component")?,
        col("month_abbv")?,
        col("encounter_count")?,
    );

    let mut by_month: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| AppError::Parse(format!("year-to-date line {line}: {e}")))?;

        if field(&record, fy_idx) != fiscal_year_label.trim()
            || field(&record, component_idx) != component.trim()
        {
            continue;
        }

        let month = field(&record, month_idx);
        let date = fiscal_month_date(fiscal_year, month)
            .and_then(fiscal_to_calendar)
            .ok_or_else(|| row_error("year-to-date", line, "month", month))?;
        let count = parse_quantity(field(&record, count_idx))
            .ok_or_else(|| row_error("year-to-date", line, "encounter count", field(&record, count_idx)))?;

        *by_month.entry(date).or_insert(0) += count;
    }

    let out: Vec<MonthlyRecord> = by_month
        .into_iter()
        .map(|(date, encounters)| MonthlyRecord { date, encounters })
        .collect();
    tracing::debug!(rows = out.len(), fiscal_year_label, component, "year-to-date encounters loaded");
    Ok(out)
}

fn open(path: &Path, what: &str) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::Io(format!("Failed to open {what} '{}': {e}", path.display())))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn read_headers<R: Read>(reader: &mut csv::Reader<R>) -> Result<HashMap<String, usize>, AppError> {
    let headers = reader
        .headers()
        .map_err(|e| AppError::Parse(format!("Failed to read CSV headers: {e}")))?;
    Ok(header_map(headers.iter()))
}

fn header_map<I, S>(names: I) -> HashMap<String, usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name.as_ref()), idx))
        .collect()
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "xlsx" | "xlsm" | "xlsb" | "xls" | "ods"))
}

/// Workbook cells as the text a CSV export would hold.
fn cell_text(value: &Data) -> String {
    match value {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(v) => v.to_string(),
        Data::Float(v) if v.is_finite() && v.fract() == 0.0 => format!("{v:.0}"),
        other => other.to_string(),
    }
}

/// Lower-case a header and collapse every run of non-alphanumerics to `_`.
///
/// `"Fiscal\nYear"` -> `fiscal_year`, `"Month (abbv)"` -> `month_abbv`.
fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often carry a UTF-8 BOM on the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn column(headers: &HashMap<String, usize>, name: &str, source: &str) -> Result<usize, AppError> {
    headers
        .get(name)
        .copied()
        .ok_or_else(|| AppError::Parse(format!("{source} extract is missing column '{name}'")))
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

fn row_error(source: &str, line: usize, what: &str, value: &str) -> AppError {
    AppError::Parse(format!("{source} line {line}: invalid {what} '{value}'"))
}

fn parse_fiscal_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix("FY")
        .or_else(|| raw.strip_prefix("fy"))
        .unwrap_or(raw);
    raw.parse::<i32>()
        .ok()
        .or_else(|| parse_whole_float(raw).and_then(|v| i32::try_from(v).ok()))
}

/// Counts may be exported as `1,234` or as `1234.0`.
fn parse_quantity(raw: &str) -> Option<u64> {
    parse_count(raw).or_else(|| parse_whole_float(&raw.replace(',', "")))
}

fn parse_whole_float(raw: &str) -> Option<u64> {
    let v = raw.trim().parse::<f64>().ok()?;
    (v.is_finite() && v >= 0.0 && v.fract() == 0.0).then_some(v as u64)
}
