//! Error types and handling for `apex_testplus`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Filesystem errors carry the offending path
//! - Malformed API data is fatal: it is a defect upstream, not something to recover from
//! - Provides recovery hints for user-facing errors
//! - Provides structured JSON output for CI tooling

mod structured;

pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `apex_testplus` operations.
#[derive(Error, Debug)]
pub enum ReportError {
    // === Filesystem Errors ===
    /// An output directory could not be created.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be opened for reading or writing.
    #[error("Failed to open '{path}': {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Malformed Input Errors ===
    /// Coverage record with a type other than `Class` or `Trigger`.
    #[error("Type \"{kind}\" is not supported")]
    UnsupportedEntityKind { kind: String },

    /// Coverage warning naming an entity with no coverage record.
    #[error("Trigger nor class not found: {name}")]
    UnknownCoverageTarget { name: String },

    /// No source file for an entity that has coverage data.
    #[error("Source file is not found: {name}")]
    SourceNotFound { name: String },

    /// Recorded API response could not be decoded.
    #[error("Invalid test run response in '{path}': {source}")]
    InvalidResponse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // === Configuration Errors ===
    /// Configuration file or environment error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Coverage target outside 0-100.
    #[error("Coverage target must be 0-100, got: {target}")]
    InvalidCoverageTarget { target: i64 },

    /// Debug log level not known to the test API.
    #[error("Invalid log type: {log_type}")]
    InvalidLogType { log_type: String },

    /// Neither `--all` nor any test class was selected.
    #[error("No test classes selected")]
    NoTestClasses,

    // === Rendering Errors ===
    /// Template registration failed.
    #[error("Template error: {0}")]
    TemplateParse(#[from] Box<handlebars::TemplateError>),

    /// Template rendering failed.
    #[error("Render error: {0}")]
    Template(#[from] handlebars::RenderError),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReportError {
    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NoTestClasses => Some("Pass --all or at least one --class"),
            Self::InvalidCoverageTarget { .. } => Some("Use a coverage target between 0 and 100"),
            Self::InvalidLogType { .. } => {
                Some("Valid log types: None, Debugonly, Db, Profiling, Callout, Detail")
            }
            Self::SourceNotFound { .. } => {
                Some("Check --src-dir points at a directory with classes/ and triggers/")
            }
            Self::CreateDir { .. } => Some("Check permissions on the output directory"),
            Self::OpenFile { .. } => Some("Check that the file exists and is readable"),
            _ => None,
        }
    }

    /// Helper for directory creation failures.
    #[must_use]
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Helper for file open failures.
    #[must_use]
    pub fn open_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OpenFile {
            path: path.into(),
            source,
        }
    }
}

impl From<handlebars::TemplateError> for ReportError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::TemplateParse(Box::new(err))
    }
}

/// Result type using `ReportError`.
pub type Result<T> = std::result::Result<T, ReportError>;
