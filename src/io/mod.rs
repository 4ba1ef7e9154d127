//! Input/output helpers.
//!
//! - CSV exports of charts and source tables (`export`)

pub mod export;

pub use export::*;
