//! Console output for `apex_testplus`.
//!
//! Supports a human-readable text summary and a machine-parseable JSON one.
//! JSON goes to stdout with diagnostics on stderr.
//!
//! # Output Types
//!
//! - [`ReportSummary`] - whole run (report --json)
//! - [`TestClassSummary`] - results of one test class
//! - [`CoverageSummary`] - coverage of one class or trigger

mod output;
mod text;

pub use output::{CoverageSummary, MethodSummary, ReportSummary, TestClassSummary};
pub use text::{format_coverage_line, format_seconds, format_summary};
