//! appack CLI - Command-line utility for packing application directories
//! into deployable archives.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    logging::init(cli.verbose, cli.quiet);
    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    let result = match &cli.command {
        cli::Commands::Pack(args) => commands::pack::execute(
            args,
            &*formatter,
            progress::Feedback::select(cli.verbose, cli.quiet, cli.json),
        ),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            Ok(())
        }
    };

    if cli.json
        && let Err(err) = &result
    {
        formatter.format_error(err);
    }

    result
}
