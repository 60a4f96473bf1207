//! Subcommand implementations.

pub mod completions;
pub mod report;
pub mod request;
pub mod version;
