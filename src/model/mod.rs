//! Wire types exchanged with the Apex test API.
//!
//! This module defines the shapes of a test-run request and its response:
//! - `RunTestsRequest` / `DebuggingHeader` - what is sent
//! - `RunTestsResult` - what comes back, with its success, failure and coverage records
//! - `LogType` - debug log verbosity
//! - `EntityKind` - class vs. trigger coverage records
//!
//! Field names follow the API's camelCase so recorded responses deserialize as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

/// Debug log verbosity requested from the test API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LogType {
    #[default]
    None,
    Debugonly,
    Db,
    Profiling,
    Callout,
    Detail,
}

impl LogType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Debugonly => "Debugonly",
            Self::Db => "Db",
            Self::Profiling => "Profiling",
            Self::Callout => "Callout",
            Self::Detail => "Detail",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "debugonly" => Ok(Self::Debugonly),
            "db" => Ok(Self::Db),
            "profiling" => Ok(Self::Profiling),
            "callout" => Ok(Self::Callout),
            "detail" => Ok(Self::Detail),
            _ => Err(ReportError::InvalidLogType {
                log_type: s.to_string(),
            }),
        }
    }
}

/// Kind of code entity a coverage record describes.
///
/// A class and a trigger may share a name, so the two live in separate keyspaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Class,
    Trigger,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Trigger => "Trigger",
        }
    }

    /// Output subdirectory holding the detail pages for this kind.
    #[must_use]
    pub const fn dir_name(&self) -> &'static str {
        match self {
            Self::Class => "classes",
            Self::Trigger => "triggers",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Class" => Ok(Self::Class),
            "Trigger" => Ok(Self::Trigger),
            other => Err(ReportError::UnsupportedEntityKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// Join an optional namespace and a name the way the platform qualifies names.
#[must_use]
pub fn qualified_name(namespace: Option<&str>, name: &str) -> String {
    match namespace.filter(|ns| !ns.is_empty()) {
        Some(ns) => format!("{ns}__{name}"),
        None => name.to_string(),
    }
}

/// Which tests to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunTestsRequest {
    pub all_tests: bool,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Debug header sent alongside a run request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DebuggingHeader {
    pub debug_level: LogType,
}

/// A passing test method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTestSuccess {
    /// Test class name.
    pub name: String,
    pub method_name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    /// Elapsed milliseconds.
    #[serde(default)]
    pub time: f64,
}

/// A failing test method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTestFailure {
    /// Test class name.
    pub name: String,
    pub method_name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    /// Elapsed milliseconds.
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub stack_trace: String,
}

/// A single instrumented source location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeLocation {
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    #[serde(default)]
    pub num_executions: u32,
    #[serde(default)]
    pub time: f64,
}

/// Coverage of one class or trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeCoverageResult {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    /// `Class` or `Trigger`; anything else is rejected during aggregation.
    #[serde(rename = "type")]
    pub kind: String,
    pub num_locations: u32,
    pub num_locations_not_covered: u32,
    #[serde(default)]
    pub locations_not_covered: Vec<CodeLocation>,
}

impl CodeCoverageResult {
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualified_name(self.namespace.as_deref(), &self.name)
    }
}

/// Coverage warning, either run-wide (no name) or about one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeCoverageWarning {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    pub message: String,
}

impl CodeCoverageWarning {
    /// Qualified entity name, or `None` for a run-level warning.
    #[must_use]
    pub fn qualified_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(|name| qualified_name(self.namespace.as_deref(), name))
    }
}

/// Result of one test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunTestsResult {
    /// Elapsed milliseconds for the whole run.
    #[serde(default)]
    pub total_time: f64,
    pub num_tests_run: u32,
    pub num_failures: u32,
    #[serde(default)]
    pub successes: Vec<RunTestSuccess>,
    #[serde(default)]
    pub failures: Vec<RunTestFailure>,
    #[serde(default)]
    pub code_coverage: Vec<CodeCoverageResult>,
    #[serde(default)]
    pub code_coverage_warnings: Vec<CodeCoverageWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_type_parse_case_insensitive() {
        assert_eq!("detail".parse::<LogType>().unwrap(), LogType::Detail);
        assert_eq!("Debugonly".parse::<LogType>().unwrap(), LogType::Debugonly);
        assert!(matches!(
            "loud".parse::<LogType>(),
            Err(ReportError::InvalidLogType { .. })
        ));
    }

    #[test]
    fn test_entity_kind_is_exact() {
        assert_eq!("Class".parse::<EntityKind>().unwrap(), EntityKind::Class);
        assert_eq!("Trigger".parse::<EntityKind>().unwrap(), EntityKind::Trigger);
        assert!(matches!(
            "ApexPage".parse::<EntityKind>(),
            Err(ReportError::UnsupportedEntityKind { kind }) if kind == "ApexPage"
        ));
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(qualified_name(Some("acme"), "Invoice"), "acme__Invoice");
        assert_eq!(qualified_name(None, "Invoice"), "Invoice");
        assert_eq!(qualified_name(Some(""), "Invoice"), "Invoice");
    }

    #[test]
    fn test_warning_without_name_is_run_level() {
        let warning = CodeCoverageWarning {
            name: None,
            namespace: Some("acme".to_string()),
            message: "Average test coverage across all Apex Classes and Triggers is 60%"
                .to_string(),
        };
        assert_eq!(warning.qualified_name(), None);
    }

    #[test]
    fn test_result_deserializes_api_shape() {
        let json = r#"{
            "totalTime": 1520.0,
            "numTestsRun": 1,
            "numFailures": 0,
            "successes": [{"name": "InvoiceTest", "methodName": "testTotal", "time": 12.0}],
            "codeCoverage": [{
                "name": "Invoice", "namespace": null, "type": "Class",
                "numLocations": 4, "numLocationsNotCovered": 1,
                "locationsNotCovered": [{"line": 7, "column": 0, "numExecutions": 0, "time": -1.0}]
            }],
            "codeCoverageWarnings": [{"name": null, "message": "low"}]
        }"#;
        let result: RunTestsResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.successes[0].method_name, "testTotal");
        assert_eq!(result.code_coverage[0].kind, "Class");
        assert_eq!(result.code_coverage[0].locations_not_covered[0].line, 7);
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = RunTestsRequest {
            all_tests: false,
            classes: vec!["InvoiceTest".to_string()],
            namespace: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["allTests"], false);
        assert_eq!(json["classes"][0], "InvoiceTest");
        assert!(json.get("namespace").is_none());
    }
}
