use std::path::PathBuf;

use clap::Parser;

/// pipkeeper: one Picture-in-Picture session across browser tabs.
#[derive(Parser, Debug)]
#[command(name = "pipkeeper", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter override, e.g. `debug` or `pip_coordinator=trace`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// TOML file describing simulated windows, tabs and videos.
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Keep the PiP owner in memory only.
    #[arg(long)]
    pub ephemeral: bool,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
