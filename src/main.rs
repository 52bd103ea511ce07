use clap::Parser;
use variation_picker::cli::{self, Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::List(args) => cli::list::run(args),
        Command::Simulate(args) => cli::simulate::run(args),
    }
}
