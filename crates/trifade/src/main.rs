mod bootstrap;
mod cli;
mod paths;
mod run;

use anyhow::Result;
use cli::{Command, ConfigAction};

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Still(args)) => run::run_still(&cli.common, args),
        Some(Command::Sequence(args)) => run::run_sequence(&cli.common, args),
        Some(Command::Probe(args)) => run::run_probe(&cli.common, args),
        Some(Command::Config(config_cmd)) => match config_cmd.action {
            ConfigAction::Where => run::run_config_where(&cli.common),
            ConfigAction::Init { force } => run::run_config_init(force),
        },
        None => run::run_still(&cli.common, cli.still),
    }
}
