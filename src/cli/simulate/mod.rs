//! Simulate command - replays configured traffic through one experiment

use std::fmt::Write as _;

use clap::Args;

use super::{bootstrap, build_catalog, ConfigArgs, OutputFormat};
use crate::config::AppConfig;
use crate::infrastructure::experiment::CatalogError;
use crate::infrastructure::simulation::{RoundRobinTraffic, SimulationReport, Simulator};

/// Arguments for the simulate command
#[derive(Args, Clone, Debug)]
pub struct SimulateArgs {
    /// Experiment ID to simulate
    pub id: String,

    /// Number of picks (overrides config)
    #[arg(long, short = 'n')]
    pub size: Option<u64>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Run the simulate command
pub fn run(args: SimulateArgs) -> anyhow::Result<()> {
    let config = bootstrap(&args.config)?;
    let report = simulate(&config, &args.id, args.size)?;

    print!("{}", render(&report, args.format)?);
    Ok(())
}

/// Build the catalog and run `id` against the configured traffic
pub fn simulate(
    config: &AppConfig,
    id: &str,
    size: Option<u64>,
) -> anyhow::Result<SimulationReport> {
    let catalog = build_catalog(config)?;
    let experiment = catalog
        .get(id)
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

    let traffic = RoundRobinTraffic::new(config.simulation.traffic.clone());
    let size = size.unwrap_or(config.simulation.size);

    Ok(Simulator::new(traffic).run(&experiment, size)?)
}

pub fn render(report: &SimulationReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)? + "\n"),
        OutputFormat::Pretty => Ok(render_pretty(report)),
    }
}

fn render_pretty(report: &SimulationReport) -> String {
    let mut out = String::new();
    let width = report
        .counts
        .iter()
        .map(|c| c.variation.len())
        .max()
        .unwrap_or(0)
        .max("(unassigned)".len());

    let _ = writeln!(out, "{} picks", report.size);
    for count in &report.counts {
        let _ = writeln!(
            out,
            "{:<width$}  {:>8}  {:>6.2}%",
            count.variation,
            count.count,
            count.share * 100.0
        );
    }

    if report.unassigned > 0 {
        let share = report.unassigned as f64 / report.size as f64;
        let _ = writeln!(
            out,
            "{:<width$}  {:>8}  {:>6.2}%",
            "(unassigned)",
            report.unassigned,
            share * 100.0
        );
    }

    out
}
