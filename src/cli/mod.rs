//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::CliOverrides;

pub mod commands;

/// Apex test run reports: results, coverage and per-method debug logs
#[derive(Parser, Debug)]
#[command(name = "apex-testplus", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: ./apextest.yaml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the HTML report from a recorded test run
    Report(ReportArgs),

    /// Show the run request that the configuration describes
    Request(RequestArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Show version information
    Version,
}

/// Settings shared by every command that resolves configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Directory holding classes/*.cls and triggers/*.trigger
    #[arg(long)]
    pub src_dir: Option<PathBuf>,

    /// Directory receiving the report
    #[arg(long, short = 'o')]
    pub out_dir: Option<PathBuf>,

    /// Minimum coverage percentage counted as passing (0-100)
    #[arg(long, allow_negative_numbers = true)]
    pub coverage_target: Option<i64>,

    /// Debug log level (None, Debugonly, Db, Profiling, Callout, Detail)
    #[arg(long)]
    pub log_type: Option<String>,

    /// Namespace prefix of the tested code
    #[arg(long)]
    pub namespace: Option<String>,

    /// Run every test in the org
    #[arg(long)]
    pub all: bool,

    /// Test class to run (repeatable)
    #[arg(long = "class", value_name = "NAME")]
    pub classes: Vec<String>,
}

impl SelectionArgs {
    #[must_use]
    pub fn as_overrides(&self) -> CliOverrides {
        CliOverrides {
            coverage_target: self.coverage_target,
            log_type: self.log_type.clone(),
            namespace: self.namespace.clone(),
            src_dir: self.src_dir.clone(),
            out_dir: self.out_dir.clone(),
            run_all: self.all.then_some(true),
            classes: self.classes.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Recorded test run response (JSON)
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Debug log file, replacing the one in the recorded response
    #[arg(long)]
    pub debug_log: Option<PathBuf>,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    PowerShell,
    /// Elvish shell
    Elvish,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_report_args() {
        let cli = Cli::try_parse_from([
            "apex-testplus",
            "report",
            "--input",
            "run.json",
            "--class",
            "InvoiceTest",
            "--class",
            "AccountTest",
            "--coverage-target",
            "90",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.input, PathBuf::from("run.json"));
        let overrides = args.selection.as_overrides();
        assert_eq!(overrides.classes, vec!["InvoiceTest", "AccountTest"]);
        assert_eq!(overrides.coverage_target, Some(90));
        assert_eq!(overrides.run_all, None);
    }

    #[test]
    fn all_flag_sets_run_all() {
        let cli = Cli::try_parse_from(["apex-testplus", "request", "--all"]).unwrap();
        let Commands::Request(args) = cli.command else {
            panic!("expected request command");
        };
        assert_eq!(args.selection.as_overrides().run_all, Some(true));
    }

    #[test]
    fn report_requires_input() {
        assert!(Cli::try_parse_from(["apex-testplus", "report"]).is_err());
    }
}
