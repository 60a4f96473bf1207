//! Aggregation of one test run into per-class and per-entity results.
//!
//! A [`TestReport`] is built once from a [`RunTestsResult`], optionally gets
//! debug log segments attached, and is then only read by the renderer.
//! All collections are keyed by name in `BTreeMap`s so reports come out in
//! alphabetical order.

mod coverage;
mod percent;
mod test_class;

pub use coverage::{CoverageResult, LineStatus};
pub use percent::Percentage;
pub use test_class::{MethodFailure, MethodSuccess, TestClassResult};

use crate::debuglog::{self, CodeUnit, SegmentTarget};
use crate::error::{ReportError, Result};
use crate::model::{EntityKind, RunTestsResult};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// Name of the directory holding debug logs inside the output root.
pub const DEBUG_LOG_DIR: &str = "debuglogs";
/// File receiving the whole raw trace.
pub const FULL_DEBUG_LOG: &str = "debug.log";

/// Run-wide figures.
#[derive(Debug, Clone, Serialize)]
pub struct TestRunSummary {
    /// Elapsed milliseconds.
    pub total_time: f64,
    pub tests_run: u32,
    pub tests_succeeded: u32,
    pub tests_failed: u32,
    pub start_time: DateTime<Local>,
    pub coverage_warning: Option<String>,
}

/// Counts from splitting a debug log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DebugLogStats {
    /// Segments attached to their own test method.
    pub attached: usize,
    /// Segments appended to the preceding test method.
    pub carried: usize,
    /// Segments with nowhere to go.
    pub dropped: usize,
}

/// Aggregated results of one test run.
#[derive(Debug, Clone)]
pub struct TestReport {
    summary: TestRunSummary,
    test_classes: BTreeMap<String, TestClassResult>,
    class_coverage: BTreeMap<String, CoverageResult>,
    trigger_coverage: BTreeMap<String, CoverageResult>,
}

impl TestReport {
    /// Group a run's records by test class and by covered entity.
    ///
    /// # Errors
    ///
    /// - `UnsupportedEntityKind` if a coverage record is neither a class nor a trigger
    /// - `UnknownCoverageTarget` if a named coverage warning matches no trigger or class
    pub fn from_result(result: &RunTestsResult, start_time: DateTime<Local>) -> Result<Self> {
        let mut test_classes: BTreeMap<String, TestClassResult> = BTreeMap::new();
        for success in &result.successes {
            test_classes
                .entry(success.name.clone())
                .or_insert_with(|| TestClassResult::new(&success.name))
                .add_success(success);
        }
        for failure in &result.failures {
            test_classes
                .entry(failure.name.clone())
                .or_insert_with(|| TestClassResult::new(&failure.name))
                .add_failure(failure);
        }

        let mut class_coverage: BTreeMap<String, CoverageResult> = BTreeMap::new();
        let mut trigger_coverage: BTreeMap<String, CoverageResult> = BTreeMap::new();
        for record in &result.code_coverage {
            let kind: EntityKind = record.kind.parse()?;
            let key = record.qualified_name();
            let target = match kind {
                EntityKind::Class => &mut class_coverage,
                EntityKind::Trigger => &mut trigger_coverage,
            };
            target
                .entry(key.clone())
                .or_insert_with(|| CoverageResult::new(key, &record.name, kind))
                .add_coverage(record);
        }

        let mut coverage_warning = None;
        for warning in &result.code_coverage_warnings {
            let Some(name) = warning.qualified_name() else {
                coverage_warning = Some(warning.message.clone());
                continue;
            };

            // A class and a trigger may share the name. Warnings are usually
            // about triggers, so those are tried first.
            let entity = match trigger_coverage.get_mut(&name) {
                Some(trigger) => trigger,
                None => class_coverage
                    .get_mut(&name)
                    .ok_or(ReportError::UnknownCoverageTarget { name })?,
            };
            entity.set_warning(&warning.message);
        }

        let summary = TestRunSummary {
            total_time: result.total_time,
            tests_run: result.num_tests_run,
            tests_succeeded: result.num_tests_run.saturating_sub(result.num_failures),
            tests_failed: result.num_failures,
            start_time,
            coverage_warning,
        };

        debug!(
            test_classes = test_classes.len(),
            classes = class_coverage.len(),
            triggers = trigger_coverage.len(),
            "Aggregated test run"
        );

        Ok(Self {
            summary,
            test_classes,
            class_coverage,
            trigger_coverage,
        })
    }

    #[must_use]
    pub const fn summary(&self) -> &TestRunSummary {
        &self.summary
    }

    #[must_use]
    pub const fn test_classes(&self) -> &BTreeMap<String, TestClassResult> {
        &self.test_classes
    }

    #[must_use]
    pub fn test_class(&self, name: &str) -> Option<&TestClassResult> {
        self.test_classes.get(name)
    }

    /// Coverage entries of one kind, keyed by qualified name.
    #[must_use]
    pub const fn coverage(&self, kind: EntityKind) -> &BTreeMap<String, CoverageResult> {
        match kind {
            EntityKind::Class => &self.class_coverage,
            EntityKind::Trigger => &self.trigger_coverage,
        }
    }

    /// Covered share of all instrumented locations, classes and triggers together.
    ///
    /// Zero when nothing is instrumented.
    #[must_use]
    pub fn total_coverage(&self) -> Percentage {
        let (covered, total) = self
            .class_coverage
            .values()
            .chain(self.trigger_coverage.values())
            .fold((0u64, 0u64), |(covered, total), ccr| {
                (
                    covered + u64::from(ccr.num_locations_covered()),
                    total + u64::from(ccr.num_locations()),
                )
            });
        Percentage::from_ratio(covered, total).unwrap_or(Percentage::ZERO)
    }

    /// Save the raw trace and split it into per-method logs under
    /// `<out_dir>/debuglogs`.
    ///
    /// The whole trace goes to `debuglogs/debug.log`. Each segment is appended
    /// to `debuglogs/<class>/<method>.log`.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created or a file cannot be
    /// opened or written.
    pub fn attach_debug_log(&mut self, out_dir: &Path, trace: &str) -> Result<DebugLogStats> {
        let log_dir = out_dir.join(DEBUG_LOG_DIR);
        fs::create_dir_all(&log_dir).map_err(|e| ReportError::create_dir(&log_dir, e))?;
        write_full_log(&log_dir, trace)?;

        let mut stats = DebugLogStats::default();
        let mut previous: Option<CodeUnit> = None;

        for segment in debuglog::split_segments(trace) {
            match debuglog::classify(&segment, |class| self.test_classes.contains_key(class)) {
                SegmentTarget::Method(unit) => {
                    self.attach_segment(&log_dir, &unit, &segment.text)?;
                    previous = Some(unit);
                    stats.attached += 1;
                }
                SegmentTarget::CarryToPrevious => {
                    if let Some(unit) = &previous {
                        self.attach_segment(&log_dir, unit, &segment.text)?;
                        stats.carried += 1;
                    } else {
                        trace!(unit = ?segment.unit, "Dropping debug log segment");
                        stats.dropped += 1;
                    }
                }
            }
        }

        info!(
            attached = stats.attached,
            carried = stats.carried,
            dropped = stats.dropped,
            "Split debug log"
        );
        Ok(stats)
    }

    fn attach_segment(&mut self, log_dir: &Path, unit: &CodeUnit, text: &str) -> Result<PathBuf> {
        match self.test_classes.get_mut(&unit.class_name) {
            Some(tcr) => tcr.attach_debug_log(log_dir, &unit.method_name, text),
            None => Err(anyhow::anyhow!("unknown test class {}", unit.class_name).into()),
        }
    }
}

fn write_full_log(log_dir: &Path, trace: &str) -> Result<()> {
    let path = log_dir.join(FULL_DEBUG_LOG);
    let file = File::create(&path).map_err(|e| ReportError::open_file(&path, e))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{trace}")?;
    out.flush()?;
    Ok(())
}
