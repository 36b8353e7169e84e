//! `splitget completions <shell>`: shell completion script on stdout.

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;

pub fn run_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "splitget", &mut std::io::stdout());
    Ok(())
}
