use crate::model::EntityKind;
use crate::report::{CoverageResult, DebugLogStats, Percentage, TestClassResult, TestReport};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

/// One test method outcome.
#[derive(Debug, Clone, Serialize)]
pub struct MethodSummary {
    pub method_name: String,
    pub success: bool,
    /// Elapsed milliseconds.
    pub time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_log: Option<PathBuf>,
}

/// Results of one test class.
#[derive(Debug, Clone, Serialize)]
pub struct TestClassSummary {
    pub name: String,
    pub methods: Vec<MethodSummary>,
}

impl From<&TestClassResult> for TestClassSummary {
    fn from(tcr: &TestClassResult) -> Self {
        let log = |method: &str| tcr.debug_log(method).map(PathBuf::from);
        let successes = tcr.successes().iter().map(|s| MethodSummary {
            method_name: s.method_name.clone(),
            success: true,
            time: s.time,
            message: None,
            debug_log: log(&s.method_name),
        });
        let failures = tcr.failures().iter().map(|f| MethodSummary {
            method_name: f.method_name.clone(),
            success: false,
            time: f.time,
            message: Some(f.message.clone()),
            debug_log: log(&f.method_name),
        });

        Self {
            name: tcr.name().to_string(),
            methods: successes.chain(failures).collect(),
        }
    }
}

/// Coverage of one class or trigger.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageSummary {
    pub name: String,
    pub kind: EntityKind,
    /// Absent when the entity has no instrumented locations.
    pub percentage: Option<Percentage>,
    pub covered: u32,
    pub total: u32,
    pub meets_target: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl CoverageSummary {
    fn new(ccr: &CoverageResult, coverage_target: u32) -> Self {
        let percentage = ccr.percentage();
        Self {
            name: ccr.name().to_string(),
            kind: ccr.kind(),
            percentage,
            covered: ccr.num_locations_covered(),
            total: ccr.num_locations(),
            meets_target: percentage.is_some_and(|p| p.meets(coverage_target)),
            warning: ccr.warning().map(str::to_string),
        }
    }
}

/// Whole-run summary printed by `report --json`.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub start_time: DateTime<Local>,
    /// Elapsed milliseconds.
    pub total_time: f64,
    pub tests_run: u32,
    pub tests_succeeded: u32,
    pub tests_failed: u32,
    pub coverage_target: u32,
    pub total_coverage: Percentage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_warning: Option<String>,
    pub test_classes: Vec<TestClassSummary>,
    pub classes: Vec<CoverageSummary>,
    pub triggers: Vec<CoverageSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_log: Option<DebugLogStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<PathBuf>,
}

impl ReportSummary {
    #[must_use]
    pub fn new(report: &TestReport, coverage_target: u32) -> Self {
        let summary = report.summary();
        let coverage = |kind: EntityKind| -> Vec<CoverageSummary> {
            report
                .coverage(kind)
                .values()
                .map(|ccr| CoverageSummary::new(ccr, coverage_target))
                .collect()
        };

        Self {
            start_time: summary.start_time,
            total_time: summary.total_time,
            tests_run: summary.tests_run,
            tests_succeeded: summary.tests_succeeded,
            tests_failed: summary.tests_failed,
            coverage_target,
            total_coverage: report.total_coverage(),
            coverage_warning: summary.coverage_warning.clone(),
            test_classes: report
                .test_classes()
                .values()
                .map(TestClassSummary::from)
                .collect(),
            classes: coverage(EntityKind::Class),
            triggers: coverage(EntityKind::Trigger),
            debug_log: None,
            index: None,
        }
    }

    #[must_use]
    pub fn with_debug_log(mut self, stats: DebugLogStats) -> Self {
        self.debug_log = Some(stats);
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: PathBuf) -> Self {
        self.index = Some(index);
        self
    }
}
