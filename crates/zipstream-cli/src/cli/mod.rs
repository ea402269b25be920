//! CLI for the zipstream archive exporter.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::{Path, PathBuf};
use zipstream_core::config::{self, ZipstreamConfig};

use commands::{run_completions, run_export, run_filename, run_list, run_man};

/// Top-level CLI for zipstream.
#[derive(Debug, Parser)]
#[command(name = "zipstream")]
#[command(about = "Stream remotely hosted files into a single ZIP archive", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/zipstream/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Build a ZIP archive from a descriptor.
    Export {
        /// Descriptor: http(s) URL of the first page, a JSON file, or `-` for stdin.
        descriptor: String,
        /// Output file or directory; `-` writes to stdout. Defaults to the suggested filename.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Override the descriptor's suggested filename.
        #[arg(long)]
        name: Option<String>,
    },

    /// Print the entries a descriptor resolves to, following pagination.
    List {
        /// Descriptor: http(s) URL of the first page, a JSON file, or `-` for stdin.
        descriptor: String,
    },

    /// Print the archive filename derived from a raw suggested name.
    Filename {
        raw: String,
    },

    /// Print shell completions.
    Completions {
        shell: Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Export {
                descriptor,
                output,
                name,
            } => {
                let cfg = load_config(cli.config.as_deref())?;
                run_export(cfg, &descriptor, output, name).await?;
            }
            CliCommand::List { descriptor } => {
                let cfg = load_config(cli.config.as_deref())?;
                run_list(cfg, &descriptor).await?;
            }
            CliCommand::Filename { raw } => run_filename(&raw),
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

fn load_config(path: Option<&Path>) -> Result<ZipstreamConfig> {
    let cfg = match path {
        Some(p) => config::load_from_path(p)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

#[cfg(test)]
mod tests;
