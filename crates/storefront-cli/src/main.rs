mod cli;
mod commands;
mod logging;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;
use crate::logging::Verbosity;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_subscriber(Verbosity::from_flags(cli.verbose, cli.quiet));

    let operation = cli.command.operation();
    let type_key = cli.command.type_key();
    match commands::run_from_root(&cli.root, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            commands::report_failure(&err, operation, type_key);
            ExitCode::FAILURE
        }
    }
}
