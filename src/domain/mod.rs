//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - fiscal-year date conversion (`fiscal`)
//! - monthly encounter series and the detention table row (`types`)
//! - closed selector enums (`Dataset`, `Display`, `Authority`, `ChartSelection`)

pub mod fiscal;
pub mod types;

pub use fiscal::*;
pub use types::*;
