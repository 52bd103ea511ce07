//! List command - prints the configured experiments

use std::fmt::Write as _;

use clap::Args;

use super::{bootstrap, build_catalog, ConfigArgs};
use crate::infrastructure::experiment::InMemoryExperimentCatalog;

/// Arguments for the list command
#[derive(Args, Clone, Debug, Default)]
pub struct ListArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Run the list command
pub fn run(args: ListArgs) -> anyhow::Result<()> {
    let config = bootstrap(&args.config)?;
    let catalog = build_catalog(&config)?;

    print!("{}", render(&catalog));
    Ok(())
}

/// One line per experiment: ID, variation count, strategy and targeting
pub fn render(catalog: &InMemoryExperimentCatalog) -> String {
    let mut out = String::new();

    if catalog.is_empty() {
        out.push_str("No experiments configured\n");
        return out;
    }

    for id in catalog.ids() {
        let Some(experiment) = catalog.get(id.as_str()) else {
            continue;
        };

        let targeting = match experiment.targeting() {
            Some(targeting) => serde_json::to_string(targeting).unwrap_or_default(),
            None => "-".to_string(),
        };

        let _ = writeln!(
            out,
            "{}\t{} variations\t{}\t{}",
            id,
            experiment.len(),
            experiment.strategy(),
            targeting
        );
    }

    out
}
