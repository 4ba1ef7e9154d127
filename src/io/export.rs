//! CSV exports.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! scripts. Column names follow the in-memory contract: the long chart table
//! uses the chart's legend/value names, the source tables use their field names.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::chart::Chart;
use crate::domain::{DetentionRow, MonthlySeries};
use crate::error::AppError;

/// Write the melted chart table: `date,<legend_title>,<value_name>`.
pub fn write_chart_csv<W: Write>(out: W, chart: &Chart) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(["date", chart.legend_title, chart.value_name])
        .map_err(write_error)?;
    for row in chart.long_rows() {
        writer
            .write_record([row.date.to_string(), row.series, row.value.to_string()])
            .map_err(write_error)?;
    }
    writer.flush().map_err(|e| AppError::Io(format!("Failed to flush CSV: {e}")))
}

/// Write the merged encounter series: `date,encounters`.
pub fn write_series_csv<W: Write>(out: W, series: &MonthlySeries) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    for record in series.records() {
        writer.serialize(record).map_err(write_error)?;
    }
    writer.flush().map_err(|e| AppError::Io(format!("Failed to flush CSV: {e}")))
}

/// Write the raw detention table with its thirteen columns.
pub fn write_detentions_csv<W: Write>(out: W, rows: &[DetentionRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row).map_err(write_error)?;
    }
    writer.flush().map_err(|e| AppError::Io(format!("Failed to flush CSV: {e}")))
}

/// Create `path` and hand it to one of the writers above.
pub fn export_to_path<F>(path: &Path, write: F) -> Result<(), AppError>
where
    F: FnOnce(File) -> Result<(), AppError>,
{
    let file = File::create(path)
        .map_err(|e| AppError::Io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write(file)?;
    tracing::info!(path = %path.display(), "export written");
    Ok(())
}

fn write_error(e: csv::Error) -> AppError {
    AppError::Io(format!("Failed to write export CSV row: {e}"))
}
