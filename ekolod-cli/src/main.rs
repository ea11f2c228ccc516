//! ## ekolod-cli
//! Harness entrypoint: parse arguments, initialize logging, run one
//! supervised harness round against the external simulator.

use clap::Parser;

use ekolod_telemetry::EventLogger;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    EventLogger::init_with_verbosity(cli.verbose);

    commands::run_command(cli).await
}
