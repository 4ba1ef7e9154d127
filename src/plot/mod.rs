//! Terminal plotting for the CLI (`ie chart`).

pub mod ascii;

pub use ascii::*;
