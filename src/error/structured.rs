//! Structured error output for CI tooling.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
/// Format: `SCREAMING_SNAKE_CASE` for easy parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Filesystem Errors (exit code 2) ===
    /// Output directory could not be created
    CreateDirFailed,
    /// File could not be opened
    OpenFileFailed,

    // === Input Errors (exit code 3) ===
    /// Coverage record of an unknown entity type
    UnsupportedEntityKind,
    /// Coverage warning for an entity without coverage
    UnknownCoverageTarget,
    /// Source file missing for a covered entity
    SourceNotFound,
    /// Recorded response is not valid JSON
    InvalidResponse,

    // === Config Errors (exit code 4) ===
    /// Configuration error
    ConfigError,
    /// Coverage target out of range
    InvalidCoverageTarget,
    /// Unknown debug log level
    InvalidLogType,
    /// No tests selected
    NoTestClasses,

    // === Render Errors (exit code 5) ===
    /// Template failed to parse or render
    TemplateError,

    // === I/O Errors (exit code 8) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,
    /// YAML parsing error
    YamlError,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateDirFailed => "CREATE_DIR_FAILED",
            Self::OpenFileFailed => "OPEN_FILE_FAILED",
            Self::UnsupportedEntityKind => "UNSUPPORTED_ENTITY_KIND",
            Self::UnknownCoverageTarget => "UNKNOWN_COVERAGE_TARGET",
            Self::SourceNotFound => "SOURCE_NOT_FOUND",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InvalidCoverageTarget => "INVALID_COVERAGE_TARGET",
            Self::InvalidLogType => "INVALID_LOG_TYPE",
            Self::NoTestClasses => "NO_TEST_CLASSES",
            Self::TemplateError => "TEMPLATE_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether this error is potentially retryable.
    ///
    /// Retryable means fixing the invocation (flags, config) and running again
    /// might succeed. Upstream data defects are never retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConfigError
                | Self::InvalidCoverageTarget
                | Self::InvalidLogType
                | Self::NoTestClasses
        )
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Filesystem errors
    /// - 3: Malformed input
    /// - 4: Config errors
    /// - 5: Render errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::CreateDirFailed | Self::OpenFileFailed => 2,
            Self::UnsupportedEntityKind
            | Self::UnknownCoverageTarget
            | Self::SourceNotFound
            | Self::InvalidResponse => 3,
            Self::ConfigError
            | Self::InvalidCoverageTarget
            | Self::InvalidLogType
            | Self::NoTestClasses => 4,
            Self::TemplateError => 5,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `ReportError`.
    #[must_use]
    pub fn from_error(err: &ReportError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = Self::generate_hint(err);

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &ReportError) -> (ErrorCode, Option<Value>) {
        match err {
            ReportError::CreateDir { path, .. } => (
                ErrorCode::CreateDirFailed,
                Some(json!({"path": path.display().to_string()})),
            ),
            ReportError::OpenFile { path, .. } => (
                ErrorCode::OpenFileFailed,
                Some(json!({"path": path.display().to_string()})),
            ),
            ReportError::UnsupportedEntityKind { kind } => (
                ErrorCode::UnsupportedEntityKind,
                Some(json!({"kind": kind, "valid_values": ["Class", "Trigger"]})),
            ),
            ReportError::UnknownCoverageTarget { name } => {
                (ErrorCode::UnknownCoverageTarget, Some(json!({"name": name})))
            }
            ReportError::SourceNotFound { name } => {
                (ErrorCode::SourceNotFound, Some(json!({"name": name})))
            }
            ReportError::InvalidResponse { path, source } => (
                ErrorCode::InvalidResponse,
                Some(json!({
                    "path": path.display().to_string(),
                    "line": source.line(),
                    "column": source.column(),
                })),
            ),
            ReportError::Config(_) => (ErrorCode::ConfigError, None),
            ReportError::InvalidCoverageTarget { target } => (
                ErrorCode::InvalidCoverageTarget,
                Some(json!({"provided": target})),
            ),
            ReportError::InvalidLogType { log_type } => {
                let mut valid: Vec<&str> = VALID_LOG_TYPES.iter().copied().collect();
                valid.sort_unstable();
                (
                    ErrorCode::InvalidLogType,
                    Some(json!({"provided": log_type, "valid_values": valid})),
                )
            }
            ReportError::NoTestClasses => (ErrorCode::NoTestClasses, None),
            ReportError::TemplateParse(_) | ReportError::Template(_) => {
                (ErrorCode::TemplateError, None)
            }
            ReportError::Io(_) => (ErrorCode::IoError, None),
            ReportError::Json(_) => (ErrorCode::JsonError, None),
            ReportError::Yaml(_) => (ErrorCode::YamlError, None),
            ReportError::Other(_) => (ErrorCode::InternalError, None),
        }
    }

    fn generate_hint(err: &ReportError) -> Option<String> {
        // Intent detection beats the generic suggestion when it finds something
        if let ReportError::InvalidLogType { log_type } = err {
            if let Some(detected) = detect_log_type_intent(log_type) {
                return Some(format!("Did you mean --log-type {detected}?"));
            }
        }

        if let Some(suggestion) = err.suggestion() {
            return Some(suggestion.to_string());
        }

        match err {
            ReportError::InvalidResponse { source, .. } => Some(format!(
                "Check line {} of the recorded response for syntax errors.",
                source.line()
            )),
            ReportError::UnknownCoverageTarget { .. } => Some(
                "The API returned a coverage warning without a coverage record for it."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

/// Debug log levels accepted by the test API.
static VALID_LOG_TYPES: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    vec!["None", "Debugonly", "Db", "Profiling", "Callout", "Detail"]
});

/// Common spellings mapped to a real log level.
static LOG_TYPE_SYNONYMS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("off", "None"),
        ("no", "None"),
        ("debug", "Debugonly"),
        ("debug_only", "Debugonly"),
        ("debug-only", "Debugonly"),
        ("database", "Db"),
        ("sql", "Db"),
        ("profile", "Profiling"),
        ("callouts", "Callout"),
        ("http", "Callout"),
        ("all", "Detail"),
        ("finest", "Detail"),
        ("verbose", "Detail"),
    ]
    .into_iter()
    .collect()
});

/// Detect what log level the user probably meant.
#[must_use]
pub fn detect_log_type_intent(input: &str) -> Option<&'static str> {
    let lower = input.trim().to_lowercase();
    if let Some(exact) = VALID_LOG_TYPES
        .iter()
        .find(|candidate| candidate.to_lowercase() == lower)
    {
        return Some(*exact);
    }
    LOG_TYPE_SYNONYMS.get(lower.as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::SourceNotFound.as_str(), "SOURCE_NOT_FOUND");
        assert_eq!(ErrorCode::CreateDirFailed.as_str(), "CREATE_DIR_FAILED");
    }

    #[test]
    fn test_error_code_exit_codes() {
        assert_eq!(ErrorCode::CreateDirFailed.exit_code(), 2);
        assert_eq!(ErrorCode::UnsupportedEntityKind.exit_code(), 3);
        assert_eq!(ErrorCode::InvalidLogType.exit_code(), 4);
        assert_eq!(ErrorCode::TemplateError.exit_code(), 5);
        assert_eq!(ErrorCode::IoError.exit_code(), 8);
        assert_eq!(ErrorCode::InternalError.exit_code(), 1);
    }

    #[test]
    fn test_error_code_is_retryable() {
        assert!(ErrorCode::NoTestClasses.is_retryable());
        assert!(!ErrorCode::UnknownCoverageTarget.is_retryable());
        assert!(!ErrorCode::SourceNotFound.is_retryable());
    }

    #[test]
    fn test_structured_error_to_json() {
        let err = ReportError::create_dir(
            PathBuf::from("/tmp/out/classes"),
            std::io::Error::other("boom"),
        );
        let structured = StructuredError::from_error(&err);
        let json = structured.to_json();

        assert_eq!(json["error"]["code"], "CREATE_DIR_FAILED");
        assert_eq!(json["error"]["context"]["path"], "/tmp/out/classes");
        assert_eq!(json["error"]["retryable"], false);
    }

    #[test]
    fn test_log_type_hint() {
        let err = ReportError::InvalidLogType {
            log_type: "debug".to_string(),
        };
        let structured = StructuredError::from_error(&err);
        assert_eq!(
            structured.hint.as_deref(),
            Some("Did you mean --log-type Debugonly?")
        );
    }

    #[test]
    fn test_detect_log_type_intent() {
        assert_eq!(detect_log_type_intent("PROFILING"), Some("Profiling"));
        assert_eq!(detect_log_type_intent("finest"), Some("Detail"));
        assert_eq!(detect_log_type_intent("nonsense"), None);
    }

    #[test]
    fn test_to_human_without_color() {
        let structured = StructuredError::from_error(&ReportError::NoTestClasses);
        assert_eq!(
            structured.to_human(false),
            "Error: No test classes selected\nHint: Pass --all or at least one --class"
        );
    }
}
