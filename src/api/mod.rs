//! Access to the Apex test runner.
//!
//! [`TestApi`] is the seam between report generation and whatever executes
//! the tests. [`RecordedApi`] replays a saved response, which is how reports
//! are produced from CI artifacts and in tests.

use crate::error::{ReportError, Result};
use crate::model::{DebuggingHeader, RunTestsRequest, RunTestsResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Everything a test run hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunTestsResponse {
    pub result: RunTestsResult,
    /// Raw debug log, present when a debug level was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log: Option<String>,
}

/// Runs tests and returns their results.
pub trait TestApi {
    /// Execute the tests selected by `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the run cannot be performed or its response decoded.
    fn run_tests(
        &self,
        request: &RunTestsRequest,
        header: &DebuggingHeader,
    ) -> Result<RunTestsResponse>;
}

/// Replays a recorded `{ "result": ..., "debugLog": ... }` document.
#[derive(Debug, Clone)]
pub struct RecordedApi {
    source: PathBuf,
    response: RunTestsResponse,
}

impl RecordedApi {
    /// Load a recorded response from disk.
    ///
    /// # Errors
    ///
    /// - `OpenFile` if the file cannot be read
    /// - `InvalidResponse` if it is not a valid response document
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| ReportError::open_file(path, e))?;
        let response = serde_json::from_str(&contents).map_err(|source| {
            ReportError::InvalidResponse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!(path = %path.display(), "Loaded recorded test run");
        Ok(Self {
            source: path.to_path_buf(),
            response,
        })
    }

    #[must_use]
    pub const fn from_response(response: RunTestsResponse) -> Self {
        Self {
            source: PathBuf::new(),
            response,
        }
    }

    /// Replace the recorded debug log, e.g. with one saved separately.
    #[must_use]
    pub fn with_debug_log(mut self, debug_log: String) -> Self {
        self.response.debug_log = Some(debug_log);
        self
    }
}

impl TestApi for RecordedApi {
    fn run_tests(
        &self,
        request: &RunTestsRequest,
        header: &DebuggingHeader,
    ) -> Result<RunTestsResponse> {
        debug!(
            source = %self.source.display(),
            all_tests = request.all_tests,
            classes = request.classes.len(),
            debug_level = %header.debug_level,
            "Replaying recorded test run"
        );
        if !request.all_tests {
            let ran = self
                .response
                .result
                .successes
                .iter()
                .map(|s| &s.name)
                .chain(self.response.result.failures.iter().map(|f| &f.name));
            for name in ran {
                if !request.classes.contains(name) {
                    warn!(class = %name, "Recorded result includes a class that was not requested");
                    break;
                }
            }
        }
        Ok(self.response.clone())
    }
}
