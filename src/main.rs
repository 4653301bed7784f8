//! `dotdeploy` command-line entry point.
use anyhow::Result;
use clap::Parser;

use dotdeploy::cli::{Cli, Command};
use dotdeploy::commands;
use dotdeploy::logging::{Logger, init_subscriber};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if matches!(args.command, Command::Version) {
        commands::version::run();
        return Ok(());
    }

    let command = args.command_name();
    init_subscriber(args.verbose, command);
    let log = Logger::new(command);

    match &args.command {
        Command::Import(opts) => commands::import::run(&args.global, opts, &log),
        Command::Recover(opts) => commands::recover::run(&args.global, opts, &log),
        Command::Backups => commands::backups::run(&args.global, &log),
        Command::Version => Ok(()),
    }
}
