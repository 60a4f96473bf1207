//! Per-test-class results and their attached debug logs.

use crate::error::{ReportError, Result};
use crate::model::{RunTestFailure, RunTestSuccess};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::trace;

/// A passing test method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSuccess {
    pub method_name: String,
    /// Elapsed milliseconds.
    pub time: f64,
}

/// A failing test method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodFailure {
    pub method_name: String,
    /// Elapsed milliseconds.
    pub time: f64,
    pub message: String,
    pub stack_trace: String,
}

/// All results for one test class, in the order the API reported them.
#[derive(Debug, Clone, Default)]
pub struct TestClassResult {
    name: String,
    successes: Vec<MethodSuccess>,
    failures: Vec<MethodFailure>,
    debug_logs: BTreeMap<String, PathBuf>,
}

impl TestClassResult {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_success(&mut self, success: &RunTestSuccess) {
        self.successes.push(MethodSuccess {
            method_name: success.method_name.clone(),
            time: success.time,
        });
    }

    pub fn add_failure(&mut self, failure: &RunTestFailure) {
        self.failures.push(MethodFailure {
            method_name: failure.method_name.clone(),
            time: failure.time,
            message: failure.message.clone(),
            stack_trace: failure.stack_trace.clone(),
        });
    }

    #[must_use]
    pub fn successes(&self) -> &[MethodSuccess] {
        &self.successes
    }

    #[must_use]
    pub fn failures(&self) -> &[MethodFailure] {
        &self.failures
    }

    /// Path of the debug log attached to `method_name`, if any.
    #[must_use]
    pub fn debug_log(&self, method_name: &str) -> Option<&Path> {
        self.debug_logs.get(method_name).map(PathBuf::as_path)
    }

    /// Append a trace segment to `<log_dir>/<class>/<method>.log`.
    ///
    /// The file and its directory are created on first use. Later segments for
    /// the same method accumulate in the same file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot
    /// be opened or written.
    pub fn attach_debug_log(
        &mut self,
        log_dir: &Path,
        method_name: &str,
        segment: &str,
    ) -> Result<PathBuf> {
        let class_dir = log_dir.join(&self.name);
        fs::create_dir_all(&class_dir).map_err(|e| ReportError::create_dir(&class_dir, e))?;

        let log_file = class_dir.join(format!("{method_name}.log"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .map_err(|e| ReportError::open_file(&log_file, e))?;

        let mut out = BufWriter::new(file);
        writeln!(out, "{segment}")?;
        out.flush()?;

        trace!(
            class = %self.name,
            method = method_name,
            bytes = segment.len(),
            path = %log_file.display(),
            "Attached debug log segment"
        );

        self.debug_logs
            .insert(method_name.to_string(), log_file.clone());
        Ok(log_file)
    }
}
