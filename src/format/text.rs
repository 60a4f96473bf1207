//! Plain text run summary for terminal output.
//!
//! Layout:
//! - Overall Statistics
//! - Test Results, one `[Class]` block per test class
//! - Apex Class Coverage Results / Trigger Coverage Results

use crate::model::EntityKind;
use crate::report::{CoverageResult, TestReport};
use std::fmt::Write;

const RULE: &str = "----------------------------------------";

/// Format milliseconds as seconds, without trailing zeros.
#[must_use]
pub fn format_seconds(ms: f64) -> String {
    format!("{}", ms / 1000.0)
}

/// `name: pct% (covered/total)` plus ` - warning` when there is one.
#[must_use]
pub fn format_coverage_line(ccr: &CoverageResult) -> String {
    let pct = ccr
        .percentage()
        .map_or_else(|| "-".to_string(), |p| p.to_string());
    let mut line = format!(
        "{}: {}% ({}/{})",
        ccr.name(),
        pct,
        ccr.num_locations_covered(),
        ccr.num_locations()
    );
    if let Some(warning) = ccr.warning() {
        line.push_str(" - ");
        line.push_str(warning);
    }
    line
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{RULE}");
}

/// Render the whole run as plain text.
#[must_use]
pub fn format_summary(report: &TestReport) -> String {
    let summary = report.summary();
    let total = report.total_coverage();
    let mut out = String::new();

    heading(&mut out, "Overall Statistics");
    let _ = writeln!(out, "Total Time: {} sec", format_seconds(summary.total_time));
    let _ = writeln!(out, "Number of Tests: {}", summary.tests_run);
    let _ = writeln!(out, "Successes: {}", summary.tests_succeeded);
    let _ = writeln!(out, "Failures: {}", summary.tests_failed);
    match &summary.coverage_warning {
        Some(warning) => {
            let _ = writeln!(out, "Total Coverage: {total}% - {warning}");
        }
        None => {
            let _ = writeln!(out, "Total Coverage: {total}%");
        }
    }

    out.push('\n');
    heading(&mut out, "Test Results");
    for tcr in report.test_classes().values() {
        let _ = writeln!(out, "[{}]", tcr.name());
        for success in tcr.successes() {
            let _ = writeln!(
                out,
                "  SUCCESS: {} ({} sec)",
                success.method_name,
                format_seconds(success.time)
            );
        }
        for failure in tcr.failures() {
            let _ = writeln!(
                out,
                "  FAILURE: {} ({} sec) - {}",
                failure.method_name,
                format_seconds(failure.time),
                failure.message
            );
        }
    }

    for (kind, title) in [
        (EntityKind::Class, "Apex Class Coverage Results"),
        (EntityKind::Trigger, "Trigger Coverage Results"),
    ] {
        out.push('\n');
        heading(&mut out, title);
        for ccr in report.coverage(kind).values() {
            let _ = writeln!(out, "{}", format_coverage_line(ccr));
        }
    }

    out
}
