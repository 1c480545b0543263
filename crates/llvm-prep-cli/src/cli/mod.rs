//! CLI for llvm-prep.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use llvm_prep_core::checksum::DEFAULT_CHECKSUM_PATH;
use llvm_prep_core::config::{self, PrepConfig};
use std::path::PathBuf;

use commands::{run_build, run_checksum, run_url, BuildOverrides};

/// Top-level CLI for llvm-prep.
#[derive(Debug, Parser)]
#[command(name = "llvm-prep")]
#[command(about = "llvm-prep: fetch, checksum and build a pinned LLVM snapshot", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/llvm-prep/config.toml.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the SHA-256 of a file.
    Checksum {
        /// File to hash.
        #[arg(default_value = DEFAULT_CHECKSUM_PATH)]
        path: PathBuf,
    },

    /// Print the source archive URL for the configured commit.
    Url {
        /// Commit to use instead of the configured one.
        #[arg(long)]
        commit: Option<String>,
    },

    /// Download, extract, configure, build and install LLVM.
    Build {
        /// Directory the archive is downloaded and extracted into (default: current dir).
        #[arg(long, value_name = "DIR")]
        work_dir: Option<PathBuf>,
        /// Commit to fetch instead of the configured one.
        #[arg(long)]
        commit: Option<String>,
        /// Parallel ninja jobs.
        #[arg(long, value_name = "N")]
        jobs: Option<u32>,
        /// Run `ninja install` without sudo.
        #[arg(long)]
        no_sudo: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<PrepConfig> {
    let cfg = match path {
        Some(p) => config::load_from(p)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            // Hashing needs no config.
            CliCommand::Checksum { path } => run_checksum(&path)?,
            CliCommand::Url { commit } => {
                let cfg = load_config(cli.config.as_ref())?;
                run_url(&cfg, commit.as_deref());
            }
            CliCommand::Build {
                work_dir,
                commit,
                jobs,
                no_sudo,
            } => {
                let cfg = load_config(cli.config.as_ref())?;
                let work_dir = match work_dir {
                    Some(d) => d,
                    None => std::env::current_dir()?,
                };
                let overrides = BuildOverrides {
                    commit,
                    jobs,
                    no_sudo,
                };
                run_build(cfg, overrides, &work_dir)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
