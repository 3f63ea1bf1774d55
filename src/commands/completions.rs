//! Shell completions command

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::{Cli, CompletionsArgs};
use crate::error::Result;
use crate::error::config::invalid;

const SUPPORTED_SHELLS: &str = "bash, elvish, fish, powershell, zsh";

fn parse_shell(name: &str) -> Result<Shell> {
    match name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "elvish" => Ok(Shell::Elvish),
        "fish" => Ok(Shell::Fish),
        "powershell" | "pwsh" => Ok(Shell::PowerShell),
        "zsh" => Ok(Shell::Zsh),
        _ => Err(invalid(format!(
            "unknown shell '{name}' (supported: {SUPPORTED_SHELLS})"
        ))),
    }
}

/// Write a completion script for the requested shell to stdout
pub fn run(args: CompletionsArgs) -> Result<()> {
    let shell = parse_shell(&args.shell)?;
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "flakepin", &mut std::io::stdout().lock());
    Ok(())
}
