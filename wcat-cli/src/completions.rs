// ABOUTME: Shell completion generation using clap_complete
// ABOUTME: Writes static completion scripts for bash, zsh, fish, and powershell

use anyhow::Result;
use clap::{Command, ValueEnum};
use clap_complete::{generate, shells};
use std::fmt;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[allow(clippy::enum_variant_names)]
    PowerShell,
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
            Shell::PowerShell => "powershell",
        };
        write!(f, "{}", name)
    }
}

/// Write the completion script for one shell to the writer.
pub fn write_completions<W: Write>(shell: Shell, cmd: &mut Command, writer: &mut W) -> Result<()> {
    let name = cmd.get_name().to_string();
    match shell {
        Shell::Bash => generate(shells::Bash, cmd, name, writer),
        Shell::Zsh => generate(shells::Zsh, cmd, name, writer),
        Shell::Fish => generate(shells::Fish, cmd, name, writer),
        Shell::PowerShell => generate(shells::PowerShell, cmd, name, writer),
    }
    Ok(())
}
