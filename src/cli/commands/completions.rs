//! Shell completions generation command.
//!
//! # Usage
//!
//! ```bash
//! apex-testplus completions bash > ~/.local/share/bash-completion/completions/apex-testplus
//! apex-testplus completions zsh -o ~/.zsh/completions/_apex-testplus
//! ```

use crate::cli::{Cli, CompletionsArgs, ShellType};
use crate::error::{ReportError, Result};
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::fs::File;
use std::io;
use tracing::info;

const BIN_NAME: &str = "apex-testplus";

/// Execute the completions command.
///
/// # Errors
///
/// Returns an error if the output file cannot be created.
pub fn execute(args: &CompletionsArgs) -> Result<()> {
    info!(shell = ?args.shell, output = ?args.output, "Generating shell completions");

    let mut cmd = Cli::command();
    let shell = convert_shell_type(args.shell);

    if let Some(output_path) = &args.output {
        let mut file =
            File::create(output_path).map_err(|e| ReportError::open_file(output_path, e))?;
        generate(shell, &mut cmd, BIN_NAME, &mut file);
        info!(path = %output_path.display(), "Wrote completion script");
    } else {
        generate(shell, &mut cmd, BIN_NAME, &mut io::stdout());
    }

    Ok(())
}

const fn convert_shell_type(shell: ShellType) -> Shell {
    match shell {
        ShellType::Bash => Shell::Bash,
        ShellType::Zsh => Shell::Zsh,
        ShellType::Fish => Shell::Fish,
        ShellType::PowerShell => Shell::PowerShell,
        ShellType::Elvish => Shell::Elvish,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut cmd = Cli::command();
        let mut output = Vec::new();
        generate(shell, &mut cmd, BIN_NAME, &mut output);
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_convert_shell_type() {
        assert_eq!(convert_shell_type(ShellType::Bash), Shell::Bash);
        assert_eq!(convert_shell_type(ShellType::PowerShell), Shell::PowerShell);
        assert_eq!(convert_shell_type(ShellType::Elvish), Shell::Elvish);
    }

    #[test]
    fn test_bash_completion_contains_commands() {
        let script = script(Shell::Bash);
        assert!(script.contains("report"), "should include report command");
        assert!(script.contains("request"), "should include request command");
        assert!(script.contains("--coverage-target"));
        assert!(script.contains("--json"), "should include --json flag");
    }

    #[test]
    fn test_zsh_completion_generation() {
        assert!(script(Shell::Zsh).contains("#compdef"));
    }
}
