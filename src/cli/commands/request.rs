//! Request command: show what would be sent to the test API.

use crate::cli::RequestArgs;
use crate::config::{self, ReportConfig};
use crate::error::Result;
use crate::model::{DebuggingHeader, RunTestsRequest};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestOutput<'a> {
    request: &'a RunTestsRequest,
    debugging_header: &'a DebuggingHeader,
}

/// Execute the request command.
///
/// # Errors
///
/// Returns an error if configuration is invalid or selects no tests.
pub fn execute(args: &RequestArgs, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config(config_path, &args.selection.as_overrides())?;
    let request = config.to_request()?;
    let header = config.debugging_header();

    if json {
        let output = RequestOutput {
            request: &request,
            debugging_header: &header,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", format_request(&config, &request));
    }
    Ok(())
}

fn format_request(config: &ReportConfig, request: &RunTestsRequest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Source Directory: {}", config.src_dir.display());
    let _ = writeln!(out, "Output Directory: {}", config.out_dir.display());
    let _ = writeln!(out, "Debug Log Option: {}", config.log_type);
    let _ = writeln!(out, "Coverage Target: {}%", config.coverage_target);
    if let Some(ns) = &request.namespace {
        let _ = writeln!(out, "Namespace: {ns}");
    }
    if request.all_tests {
        let _ = writeln!(out, "Classes to be tested: ALL");
    } else {
        let _ = writeln!(out, "Classes to be tested:");
        for class in &request.classes {
            let _ = writeln!(out, "  {class}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_selected_classes() {
        let config = ReportConfig {
            classes: vec!["InvoiceTest".to_string(), "AccountTest".to_string()],
            ..Default::default()
        };
        let text = format_request(&config, &config.to_request().unwrap());
        assert!(text.contains("Debug Log Option: None"));
        assert!(text.contains("Classes to be tested:\n  InvoiceTest\n  AccountTest\n"));
    }

    #[test]
    fn run_all() {
        let config = ReportConfig {
            run_all: true,
            ..Default::default()
        };
        let text = format_request(&config, &config.to_request().unwrap());
        assert!(text.contains("Classes to be tested: ALL"));
    }
}
