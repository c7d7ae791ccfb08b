mod cli_args;
mod state;

use clap::Parser;
use cli_args::CliArgs;
use tapster_diagnostics::{enable_tracing, Verbosity};

pub use state::{InitStateError, State};

pub async fn run_cli() -> miette::Result<()> {
    let cli = CliArgs::parse();
    enable_tracing(Verbosity::from_flags(cli.verbose, cli.debug));
    cli.run().await
}
