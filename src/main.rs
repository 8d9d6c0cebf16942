use anyhow::Result;
use clap::Parser;

use rigup_cli::{cli, commands, logging};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init(args.verbose);

    match args.command {
        cli::Command::Sync(opts) => commands::sync::run(&args.global, &opts),
        cli::Command::Validate => commands::validate::run(&args.global),
        cli::Command::Add(opts) => commands::add::run(&args.global, &opts),
        cli::Command::Use(opts) => commands::select::run_use(&args.global, &opts),
        cli::Command::Cease(opts) => commands::select::run_cease(&args.global, &opts),
        cli::Command::Edit => commands::edit::run(&args.global),
        cli::Command::Version => {
            let version = option_env!("RIGUP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("rigup {version}");
            Ok(())
        }
    }
}
