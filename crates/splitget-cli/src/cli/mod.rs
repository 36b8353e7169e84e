//! CLI for the splitget segmented downloader.

mod commands;
mod progress;
mod prompt;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use splitget_core::config;
use std::path::PathBuf;

use commands::{run_completions, run_get, run_man, run_probe, GetArgs};

/// Top-level CLI for the splitget downloader.
#[derive(Debug, Parser)]
#[command(name = "splitget", version)]
#[command(about = "splitget: download a file over several parallel HTTP range requests", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a URL. Missing values are asked for interactively.
    Get {
        /// Direct HTTP/HTTPS URL to download.
        url: Option<String>,

        /// Output file, or an existing directory to save into.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Number of parallel segments (1-8).
        #[arg(short, long, value_name = "N")]
        threads: Option<usize>,

        /// Do not draw progress bars.
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show size, range support and filename of a URL without downloading.
    Probe {
        /// Direct HTTP/HTTPS URL to inspect.
        url: String,
    },

    /// Print a shell completion script to stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Generated output must not depend on a readable config.
        match cli.command {
            CliCommand::Completions { shell } => return run_completions(shell),
            CliCommand::Man => return run_man(),
            _ => {}
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get {
                url,
                output,
                threads,
                quiet,
            } => {
                run_get(
                    &cfg,
                    GetArgs {
                        url,
                        output,
                        threads,
                        quiet,
                    },
                )
                .await?
            }
            CliCommand::Probe { url } => run_probe(&cfg, &url).await?,
            CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
