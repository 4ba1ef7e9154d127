//! `immigration-enforcement` library crate.
//!
//! Charts U.S. immigration enforcement data: ICE detention snapshots from
//! TRAC and monthly Southwest Land Border encounters from DHS/CBP extracts.
//!
//! The binary (`ie`) is a thin wrapper around this library so that:
//!
//! - loaders, merge and chart construction are testable without a terminal
//! - the TUI and the printing subcommands share one pipeline

pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod footnotes;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
