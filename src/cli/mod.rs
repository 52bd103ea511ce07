//! CLI module for the variation picker
//!
//! Provides subcommands for inspecting configured experiments:
//! - `list`: show the experiments in the catalog
//! - `simulate`: replay configured traffic through one experiment

pub mod list;
pub mod simulate;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::AppConfig;
use crate::infrastructure::experiment::InMemoryExperimentCatalog;
use crate::infrastructure::logging;

/// Variation picker - deterministic weighted experiment selection
#[derive(Parser)]
#[command(name = "variation-picker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List configured experiments
    List(list::ListArgs),

    /// Run an experiment against the configured traffic and report the split
    Simulate(simulate::SimulateArgs),
}

/// Arguments shared by every command
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigArgs {
    /// Extra configuration file layered over config/default and config/local
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn path(&self) -> Option<&Path> {
        self.config.as_deref()
    }
}

/// Output format for command results
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

/// Load `.env` and configuration, then install logging
fn bootstrap(args: &ConfigArgs) -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load(args.path()).context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    Ok(config)
}

fn build_catalog(config: &AppConfig) -> anyhow::Result<InMemoryExperimentCatalog> {
    InMemoryExperimentCatalog::from_definitions(&config.experiments)
        .context("Failed to build experiment catalog")
}
