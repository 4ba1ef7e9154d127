//! Command-line parsing for the enforcement dashboard.
//!
//! The goal of this module is to keep **argument parsing** separate from data
//! loading and chart construction.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Authority, Dataset, Display};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ie", version, about = "U.S. immigration enforcement dashboard (TRAC + DHS data)")]
pub struct Cli {
    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard.
    Tui,
    /// Render one chart as ASCII, with its footnote.
    Chart(ChartArgs),
    /// Print the merged Southwest Land Border encounter series.
    Encounters(ExportArgs),
    /// Print the raw TRAC detention table.
    Detentions(ExportArgs),
}

/// Overrides for the environment-derived configuration.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// Historic OHSS workbook or "Monthly Region" CSV export (overrides IE_HISTORIC_PATH).
    #[arg(long, global = true, value_name = "FILE")]
    pub historic: Option<PathBuf>,

    /// Year-to-date encounters CSV (overrides IE_YTD_PATH).
    #[arg(long, global = true, value_name = "CSV")]
    pub ytd: Option<PathBuf>,

    /// TRAC detention JSON endpoint (overrides IE_DETENTIONS_URL).
    #[arg(long = "detentions-url", global = true, value_name = "URL")]
    pub detentions_url: Option<String>,

    /// Append logs to this file instead of stderr.
    #[arg(long = "log-file", global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// "Arresting Authority", "Criminality" or "Border Patrol".
    #[arg(long)]
    pub dataset: Dataset,

    /// "Count" or "Percent" (detention datasets only).
    #[arg(long)]
    pub display: Option<Display>,

    /// "All", "ICE" or "CBP" (Criminality only).
    #[arg(long)]
    pub authority: Option<Authority>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write the chart's long (date, series, value) table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Write the table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_args_parse_labels() {
        let cli = Cli::try_parse_from([
            "ie",
            "chart",
            "--dataset",
            "Criminality",
            "--display",
            "percent",
            "--authority",
            "CBP",
        ])
        .unwrap();
        let Command::Chart(args) = cli.command else {
            panic!("expected chart command");
        };
        assert_eq!(args.dataset, Dataset::Criminality);
        assert_eq!(args.display, Some(Display::Percent));
        assert_eq!(args.authority, Some(Authority::Cbp));
    }

    #[test]
    fn unknown_authority_is_rejected_with_its_name() {
        let err = Cli::try_parse_from(["ie", "chart", "--dataset", "Criminality", "--authority", "FBI"])
            .unwrap_err();
        assert!(err.to_string().contains("Unknown authority FBI"));
    }

    #[test]
    fn source_overrides_are_global() {
        let cli = Cli::try_parse_from(["ie", "encounters", "--historic", "h.csv", "--ytd", "y.csv"]).unwrap();
        assert_eq!(cli.sources.historic, Some(PathBuf::from("h.csv")));
        assert_eq!(cli.sources.ytd, Some(PathBuf::from("y.csv")));
    }
}
