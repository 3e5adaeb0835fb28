#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Maze Chase session.

mod config;
mod input;
mod session;

use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{
    config::SessionConfig,
    input::{Autopilot, Script},
    session::{Input, Session},
};

/// Plays a Maze Chase session without rendering and prints the final summary.
#[derive(Debug, Parser)]
#[command(name = "maze-chase", version)]
struct Args {
    /// TOML file describing the level, rules, clock and pursuit tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Maximum number of simulation ticks to run.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,
    /// Seed applied to every random source, overriding the config file.
    #[arg(long)]
    seed: Option<u64>,
    /// Scripted player input such as `0:right 24:down 40:left`.
    #[arg(long, conflicts_with = "autopilot")]
    input: Option<String>,
    /// Let the built-in autopilot steer the player.
    #[arg(long)]
    autopilot: bool,
}

/// Entry point for the Maze Chase command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = SessionConfig::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.reseed(seed);
    }

    let input = if args.autopilot {
        Input::Autopilot(Autopilot::default())
    } else {
        let script = Script::parse(args.input.as_deref().unwrap_or_default())
            .context("failed to parse scripted input")?;
        Input::Script(script)
    };

    let mut session = Session::new(&config, input)?;
    let report = session.run(args.ticks);
    tracing::info!(
        ticks = report.ticks,
        levels_cleared = report.levels_cleared,
        status = ?report.status,
        "session finished"
    );

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    let summary = serde_json::to_string_pretty(&session.snapshot(timestamp))
        .context("failed to serialise session snapshot")?;
    println!("{summary}");
    Ok(())
}
