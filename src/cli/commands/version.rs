//! Version command implementation.

use crate::error::Result;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput<'a> {
    name: &'a str,
    version: &'a str,
    build: &'a str,
}

fn build_kind() -> &'static str {
    if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    }
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = build_kind();

    if json {
        let output = VersionOutput {
            name: "apex-testplus",
            version,
            build,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("apex-testplus version {version} ({build})");
    Ok(())
}
