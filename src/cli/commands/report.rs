//! Report command: replay a recorded run and render it.
//!
//! Steps:
//! 1. Resolve configuration (CLI > env > file > defaults)
//! 2. Ask the [`TestApi`] for results
//! 3. Aggregate into a [`TestReport`]
//! 4. Split the debug log into per-method files
//! 5. Render HTML and print a summary

use crate::api::{RecordedApi, TestApi};
use crate::cli::ReportArgs;
use crate::config::{self, ReportConfig};
use crate::error::{ReportError, Result};
use crate::format::{ReportSummary, format_summary};
use crate::render::{RenderOutput, Renderer};
use crate::report::{DebugLogStats, TestReport};
use crate::source::SourceIndex;
use chrono::Local;
use std::fs;
use std::path::Path;
use tracing::info;

/// Execute the report command.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the recorded run cannot be
/// loaded, or any output file cannot be written.
pub fn execute(args: &ReportArgs, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config(config_path, &args.selection.as_overrides())?;

    let mut api = RecordedApi::from_path(&args.input)?;
    if let Some(path) = &args.debug_log {
        let trace = fs::read_to_string(path).map_err(|e| ReportError::open_file(path, e))?;
        api = api.with_debug_log(trace);
    }

    let (report, stats, output) = run(&api, &config)?;

    if json {
        let mut summary = ReportSummary::new(&report, config.coverage_target)
            .with_index(output.index.clone());
        if let Some(stats) = stats {
            summary = summary.with_debug_log(stats);
        }
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", format_summary(&report));
        println!();
        println!("Report: {}", output.index.display());
    }

    Ok(())
}

/// Run the tests through `api` and write the report described by `config`.
///
/// # Errors
///
/// Returns an error if no tests are selected, the API call fails, or the
/// report cannot be written.
pub fn run(
    api: &dyn TestApi,
    config: &ReportConfig,
) -> Result<(TestReport, Option<DebugLogStats>, RenderOutput)> {
    let request = config.to_request()?;
    let header = config.debugging_header();

    info!(src_dir = %config.src_dir.display(), "Source directory");
    info!(out_dir = %config.out_dir.display(), "Output directory");
    info!(log_type = %config.log_type, "Debug log option");
    if config.run_all {
        info!("Classes to be tested: ALL");
    } else {
        info!(classes = ?config.classes, "Classes to be tested");
    }

    let sources = SourceIndex::discover(&config.src_dir)?;

    let start_time = Local::now();
    let response = api.run_tests(&request, &header)?;
    let mut report = TestReport::from_result(&response.result, start_time)?;

    let stats = match &response.debug_log {
        Some(trace) => Some(report.attach_debug_log(&config.out_dir, trace)?),
        None => None,
    };

    let output = Renderer::new(config.coverage_target)?.render(&report, &sources, &config.out_dir)?;
    Ok((report, stats, output))
}
