//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves configuration (environment, then flags)
//! - sets up logging
//! - dispatches to the TUI or to one of the printing subcommands
//! - writes optional exports

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{ChartArgs, Command, ExportArgs, SourceArgs};
use crate::config::Config;
use crate::domain::ChartSelection;
use crate::error::AppError;

pub mod pipeline;

use pipeline::Dashboard;

/// Entry point for the `ie` binary.
pub fn run() -> Result<(), AppError> {
    // `ie` alone (or `ie --historic x.csv`) opens the dashboard.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let is_tui = matches!(cli.command, Command::Tui);
    init_tracing(cli.sources.log_file.as_deref(), is_tui)?;

    let mut config = Config::from_env()?;
    apply_overrides(&mut config, &cli.sources);
    tracing::debug!(?config, "configuration resolved");

    let dashboard = Dashboard::new(config)?;
    match cli.command {
        Command::Tui => crate::tui::run(dashboard),
        Command::Chart(args) => handle_chart(dashboard, args),
        Command::Encounters(args) => handle_encounters(dashboard, args),
        Command::Detentions(args) => handle_detentions(dashboard, args),
    }
}

fn handle_chart(mut dashboard: Dashboard, args: ChartArgs) -> Result<(), AppError> {
    let selection = ChartSelection::from_parts(args.dataset, args.display, args.authority)?;
    let chart = dashboard.chart(selection)?;

    println!("{}", crate::plot::render_ascii_chart(&chart, args.width, args.height));

    let note = crate::footnotes::footnote(selection.dataset());
    if !note.is_empty() {
        println!("{note}");
    }

    if let Some(path) = &args.export {
        crate::io::export_to_path(path, |f| crate::io::write_chart_csv(f, &chart))?;
    }
    Ok(())
}

fn handle_encounters(mut dashboard: Dashboard, args: ExportArgs) -> Result<(), AppError> {
    let series = dashboard.encounters()?;
    println!("{}", crate::report::format_encounters(series));

    if let Some(path) = &args.export {
        crate::io::export_to_path(path, |f| crate::io::write_series_csv(f, series))?;
    }
    Ok(())
}

fn handle_detentions(mut dashboard: Dashboard, args: ExportArgs) -> Result<(), AppError> {
    let rows = dashboard.detentions()?;
    println!("{}", crate::report::format_detentions(rows));

    if let Some(path) = &args.export {
        crate::io::export_to_path(path, |f| crate::io::write_detentions_csv(f, rows))?;
    }
    Ok(())
}

/// Flags win over environment values.
pub fn apply_overrides(config: &mut Config, sources: &SourceArgs) {
    if let Some(path) = &sources.historic {
        config.historic_path = path.clone();
    }
    if let Some(path) = &sources.ytd {
        config.ytd_path = path.clone();
    }
    if let Some(url) = &sources.detentions_url {
        config.detentions_url = url.clone();
    }
}

/// Logs go to stderr, or to `log_file` when given. The TUI owns the
/// terminal, so without a log file it runs with logging disabled.
fn init_tracing(log_file: Option<&Path>, is_tui: bool) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::Io(format!("Failed to open log file '{}': {e}", path.display())))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None if is_tui => return Ok(()),
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    // A subscriber may already be installed (tests, embedding); keep it.
    if let Err(e) = result {
        eprintln!("tracing already initialized: {e}");
    }
    Ok(())
}

/// Rewrite argv so `ie` defaults to `ie tui`.
///
/// Rules:
/// - `ie`                        -> `ie tui`
/// - `ie --historic h.csv ...`   -> `ie tui --historic h.csv ...`
/// - `ie --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "chart" | "encounters" | "detentions");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
