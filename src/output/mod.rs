//! Report output.
//!
//! Serialization of verdicts for human and spreadsheet consumption:
//! - [`csv`] - CSV rows to stdout
//! - [`terminal`] - field formatting and run summaries
//!
//! The engine is agnostic to all of this; anything here is derived from
//! the verdict list after classification.

mod csv;
mod terminal;

// Re-export public functions
pub use csv::print_verdicts_csv;
pub use terminal::{format_field, print_summary};
