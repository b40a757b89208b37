mod cli;
mod config;
mod runner;
mod server;

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;
use watch_core::ItemId;
use watch_engine::{mute_item, run_cycle};
use watch_logging::{watch_info, LogDestination};

use crate::cli::{Args, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = config::load(&args.config)?.with_overrides(args.data_dir, args.source_url);

    let destination = if config.log_file.is_some() {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    };
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    watch_logging::initialize(destination, level, config.log_file.as_deref());

    match args.command {
        Command::PrintConfig => {
            println!("{}", config::to_ron(&config)?);
        }
        Command::Mute { id } => {
            let id = ItemId::new(id);
            if id.as_str().is_empty() {
                bail!("missing item id");
            }
            let ctx = runner::build_context(&config)?;
            let outcome = mute_item(ctx.store.as_ref(), id).context("Failed to update mute registry")?;
            watch_info!("{}", outcome);
            println!("{outcome}");
        }
        Command::Check => {
            let ctx = runner::build_context(&config)?;
            let differences = run_cycle(&ctx).await?;
            println!("{}", serde_json::to_string_pretty(&differences)?);
        }
        Command::Watch => {
            let ctx = runner::build_context(&config)?;
            tokio::select! {
                _ = runner::watch_loop(ctx, config.check_interval()) => {}
                _ = tokio::signal::ctrl_c() => watch_info!("Interrupted, stopping"),
            }
        }
        Command::Serve { port } => {
            let ctx = runner::build_context(&config)?;
            server::serve(ctx, port, config.check_interval()).await?;
        }
    }
    Ok(())
}
