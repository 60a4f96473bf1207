//! `apex_testplus` - reports for Apex test runs.
//!
//! Turns the result of one test run into a static HTML report:
//! - per-class test results with links to per-method debug logs
//! - code coverage per class and trigger, with annotated source pages
//!
//! The pipeline is [`api::TestApi`] → [`report::TestReport`] →
//! [`report::TestReport::attach_debug_log`] → [`render::Renderer`].

pub mod api;
pub mod cli;
pub mod config;
pub mod debuglog;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod render;
pub mod report;
pub mod source;

pub use error::{ErrorCode, ReportError, Result, StructuredError};
