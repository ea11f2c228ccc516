use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use ekolod_config::EkolodConfig;
use ekolod_endpoint::Transport;
use ekolod_engine::{run_harness, HarnessOptions};

/// Run a network example with node position updates against the external
/// simulator; see the script template for simulator-side configuration.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Number of sending nodes (one receiving node is always created)
    #[arg(short, long)]
    pub num_nodes: Option<u16>,

    /// Run the simulation for the given number of seconds
    #[arg(short = 't', long)]
    pub run_time: Option<u64>,

    /// Increase logger output level, up to three times
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Simulator build directory
    #[arg(short, long)]
    pub build_dir: PathBuf,

    /// Do not start the simulator locally (for remote-driven runs)
    #[arg(short = 's', long)]
    pub no_sim_start: bool,

    /// Control-channel transport
    #[arg(long, value_enum, default_value_t = TransportArg::Udp)]
    pub transport: TransportArg,

    /// Optional configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum TransportArg {
    Tcp,
    Udp,
}

impl From<TransportArg> for Transport {
    fn from(transport: TransportArg) -> Self {
        match transport {
            TransportArg::Tcp => Transport::Tcp,
            TransportArg::Udp => Transport::Udp,
        }
    }
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => EkolodConfig::load_from_path(path)?,
        None => EkolodConfig::load()?,
    };

    // CLI flags override the file/env configuration.
    if let Some(num_nodes) = cli.num_nodes {
        config.run.num_nodes = num_nodes;
    }
    if let Some(run_time) = cli.run_time {
        config.run.run_time_secs = run_time;
    }

    let options = HarnessOptions {
        build_dir: cli.build_dir.clone(),
        start_simulator: !cli.no_sim_start,
        transport: cli.transport.into(),
    };

    run_harness(config, options).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_original_flag_set() {
        let cli = Cli::parse_from([
            "ekolod",
            "-n",
            "3",
            "-t",
            "20",
            "-vv",
            "-b",
            "/opt/desert",
            "-s",
        ]);
        assert_eq!(cli.num_nodes, Some(3));
        assert_eq!(cli.run_time, Some(20));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.build_dir, PathBuf::from("/opt/desert"));
        assert!(cli.no_sim_start);
    }
}
