//! Logging setup for `apex_testplus`.
//!
//! Logs go to stderr so stdout stays clean for summaries and `--json` output.
//! `RUST_LOG` always wins over the verbosity flags.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Map `-v` count and `--quiet` to a default filter directive.
#[must_use]
pub const fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize the global tracing subscriber.
///
/// When `log_file` is set, logs are appended there (without ANSI colors)
/// instead of stderr.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global subscriber
/// is already installed.
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose, quiet)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2);

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
    } else {
        builder
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
    }

    Ok(())
}

/// Install a subscriber that writes through the test harness capture.
///
/// Safe to call from many tests; only the first call installs anything.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
