//! tarpipe CLI - unpack tar archives by streaming them into `tar` with a
//! progress bar.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    logging::init(cli.verbose, cli.quiet);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);
    let suppress_progress = cli.quiet || cli.json;

    let result = match &cli.command {
        cli::Commands::Unpack(args) => {
            commands::unpack::execute(args, &*formatter, suppress_progress)
        }
        cli::Commands::Detect(args) => commands::detect::execute(args, &*formatter),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(cli.command.operation(), &err);
            ExitCode::from(error::exit_status(&err))
        }
    }
}
