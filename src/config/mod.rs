//! Configuration loading for `apex_testplus`.
//!
//! Precedence, lowest to highest:
//! 1. Built-in defaults
//! 2. Config file (`--config <path>` or `./apextest.yaml`)
//! 3. Environment (`APEXTEST_*`)
//! 4. Command-line flags
//!
//! Each source produces a [`ConfigLayer`] of optional values. Layers are merged
//! and then resolved into a validated [`ReportConfig`].

use crate::error::{ReportError, Result};
use crate::model::{DebuggingHeader, LogType, RunTestsRequest};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILENAME: &str = "apextest.yaml";
pub const DEFAULT_COVERAGE_TARGET: u32 = 75;
pub const DEFAULT_SRC_DIR: &str = "src";
pub const DEFAULT_OUT_DIR: &str = "test-report";

const ENV_COVERAGE_TARGET: &str = "APEXTEST_COVERAGE_TARGET";
const ENV_LOG_TYPE: &str = "APEXTEST_LOG_TYPE";
const ENV_NAMESPACE: &str = "APEXTEST_NAMESPACE";
const ENV_SRC_DIR: &str = "APEXTEST_SRC_DIR";
const ENV_OUT_DIR: &str = "APEXTEST_OUT_DIR";
const ENV_RUN_ALL: &str = "APEXTEST_RUN_ALL";

/// A test class selection, either a bare name or `{ name, test }`.
///
/// Entries with `test: false` stay listed but are not run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ClassEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default = "default_true")]
        test: bool,
    },
}

const fn default_true() -> bool {
    true
}

impl ClassEntry {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Detailed { name, .. } => name,
        }
    }

    #[must_use]
    pub const fn is_test(&self) -> bool {
        match self {
            Self::Name(_) => true,
            Self::Detailed { test, .. } => *test,
        }
    }
}

/// One configuration source. Unset values defer to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigLayer {
    pub coverage_target: Option<i64>,
    pub log_type: Option<String>,
    pub namespace: Option<String>,
    pub src_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub run_all: Option<bool>,
    pub classes: Option<Vec<ClassEntry>>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        if other.coverage_target.is_some() {
            self.coverage_target = other.coverage_target;
        }
        if other.log_type.is_some() {
            self.log_type.clone_from(&other.log_type);
        }
        if other.namespace.is_some() {
            self.namespace.clone_from(&other.namespace);
        }
        if other.src_dir.is_some() {
            self.src_dir.clone_from(&other.src_dir);
        }
        if other.out_dir.is_some() {
            self.out_dir.clone_from(&other.out_dir);
        }
        if other.run_all.is_some() {
            self.run_all = other.run_all;
        }
        if other.classes.is_some() {
            self.classes.clone_from(&other.classes);
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file. An empty file yields an empty layer.
    ///
    /// # Errors
    ///
    /// - `OpenFile` if the file is missing or unreadable
    /// - `Config` if it cannot be parsed
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| ReportError::open_file(path, e))?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents)
            .map_err(|e| ReportError::Config(format!("{}: {e}", path.display())))
    }

    /// Build a layer from `APEXTEST_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a layer from any variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let coverage_target = get(ENV_COVERAGE_TARGET)
            .map(|value| {
                value.trim().parse::<i64>().map_err(|_| {
                    ReportError::Config(format!("{ENV_COVERAGE_TARGET} is not a number: {value}"))
                })
            })
            .transpose()?;
        let run_all = get(ENV_RUN_ALL)
            .map(|value| {
                parse_bool(&value).ok_or_else(|| {
                    ReportError::Config(format!("{ENV_RUN_ALL} is not a boolean: {value}"))
                })
            })
            .transpose()?;

        Ok(Self {
            coverage_target,
            log_type: get(ENV_LOG_TYPE),
            namespace: get(ENV_NAMESPACE),
            src_dir: get(ENV_SRC_DIR).map(PathBuf::from),
            out_dir: get(ENV_OUT_DIR).map(PathBuf::from),
            run_all,
            classes: None,
        })
    }
}

/// Command-line values, applied above every other layer.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub coverage_target: Option<i64>,
    pub log_type: Option<String>,
    pub namespace: Option<String>,
    pub src_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub run_all: Option<bool>,
    /// Replaces the configured class list when non-empty.
    pub classes: Vec<String>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        ConfigLayer {
            coverage_target: self.coverage_target,
            log_type: self.log_type.clone(),
            namespace: self.namespace.clone(),
            src_dir: self.src_dir.clone(),
            out_dir: self.out_dir.clone(),
            run_all: self.run_all,
            classes: (!self.classes.is_empty())
                .then(|| self.classes.iter().cloned().map(ClassEntry::Name).collect()),
        }
    }
}

/// Fully resolved settings for one report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub coverage_target: u32,
    pub log_type: LogType,
    pub namespace: Option<String>,
    pub src_dir: PathBuf,
    pub out_dir: PathBuf,
    pub run_all: bool,
    /// Classes to run, `test: false` entries already removed.
    pub classes: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            coverage_target: DEFAULT_COVERAGE_TARGET,
            log_type: LogType::None,
            namespace: None,
            src_dir: PathBuf::from(DEFAULT_SRC_DIR),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            run_all: false,
            classes: Vec::new(),
        }
    }
}

impl ReportConfig {
    /// Resolve and validate a merged layer.
    ///
    /// # Errors
    ///
    /// - `InvalidCoverageTarget` if the target is outside 0-100
    /// - `InvalidLogType` if the log type is unknown
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let defaults = Self::default();

        let coverage_target = match layer.coverage_target {
            Some(target) => u32::try_from(target)
                .ok()
                .filter(|t| *t <= 100)
                .ok_or(ReportError::InvalidCoverageTarget { target })?,
            None => defaults.coverage_target,
        };
        let log_type = match &layer.log_type {
            Some(value) => value.parse()?,
            None => defaults.log_type,
        };

        Ok(Self {
            coverage_target,
            log_type,
            namespace: layer.namespace.clone().filter(|ns| !ns.trim().is_empty()),
            src_dir: layer.src_dir.clone().unwrap_or(defaults.src_dir),
            out_dir: layer.out_dir.clone().unwrap_or(defaults.out_dir),
            run_all: layer.run_all.unwrap_or(defaults.run_all),
            classes: layer
                .classes
                .iter()
                .flatten()
                .filter(|entry| entry.is_test())
                .map(|entry| entry.name().to_string())
                .collect(),
        })
    }

    /// The run request these settings describe.
    ///
    /// # Errors
    ///
    /// Returns `NoTestClasses` when not running all tests and no class is selected.
    pub fn to_request(&self) -> Result<RunTestsRequest> {
        if !self.run_all && self.classes.is_empty() {
            return Err(ReportError::NoTestClasses);
        }
        Ok(RunTestsRequest {
            all_tests: self.run_all,
            classes: self.classes.clone(),
            namespace: self.namespace.clone(),
        })
    }

    #[must_use]
    pub const fn debugging_header(&self) -> DebuggingHeader {
        DebuggingHeader {
            debug_level: self.log_type,
        }
    }
}

/// Load configuration with precedence defaults < file < env < CLI.
///
/// An explicit `config_path` must exist. Otherwise `./apextest.yaml` is used
/// when present and skipped when absent.
///
/// # Errors
///
/// Returns an error if a config source cannot be read or parsed, or the
/// merged values fail validation.
pub fn load_config(config_path: Option<&Path>, cli: &CliOverrides) -> Result<ReportConfig> {
    let file_layer = match config_path {
        Some(path) => ConfigLayer::from_yaml(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILENAME);
            if default_path.exists() {
                ConfigLayer::from_yaml(default_path)?
            } else {
                ConfigLayer::default()
            }
        }
    };
    load_config_from_layers(file_layer, ConfigLayer::from_env()?, cli)
}

/// Merge already-built file and env layers with CLI overrides.
///
/// # Errors
///
/// Returns an error if the merged values fail validation.
pub fn load_config_from_layers(
    file_layer: ConfigLayer,
    env_layer: ConfigLayer,
    cli: &CliOverrides,
) -> Result<ReportConfig> {
    let merged = ConfigLayer::merge_layers(&[file_layer, env_layer, cli.as_layer()]);
    let config = ReportConfig::from_layer(&merged)?;
    debug!(?config, "Resolved configuration");
    Ok(config)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
