//! Terminal output helpers: theme, status lines and the run summary.

pub mod output_format;
pub mod run_summary;
pub mod theme;
