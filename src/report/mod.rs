//! Report renderers for classification and readiness results.
//!
//! - [`terminal`] — colored, tabular output with summary box; respects `--verbose` / `--quiet`.
//! - [`pdf`] — vector PDF with cover, category breakdown, item tables, and a
//!   readiness bar chart.

pub mod pdf;
pub mod terminal;
