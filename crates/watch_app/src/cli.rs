use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "clearance-watch", version, about = "Watches a clearance catalog for new items and price drops")]
pub struct Args {
    /// RON configuration file; defaults apply when it does not exist.
    #[arg(short, long, default_value = "clearance-watch.ron")]
    pub config: PathBuf,

    /// Overrides `data_dir` from the configuration.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Overrides `source_url` from the configuration.
    #[arg(long)]
    pub source_url: Option<String>,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one cycle and print the differences as JSON.
    Check,
    /// Stop reporting an item.
    Mute { id: String },
    /// Run a cycle every `check_interval_secs` until interrupted.
    Watch,
    /// Like `watch`, plus the HTTP API for checks and mute links.
    Serve {
        #[arg(long, default_value_t = 7878)]
        port: u16,
    },
    /// Print the effective configuration.
    PrintConfig,
}
