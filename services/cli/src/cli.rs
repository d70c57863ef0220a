use std::io::Write;

use crate::demo::{run_demo, DemoArgs};
use crate::replay::{run_replay, ReplayArgs};
use clap::{Parser, Subcommand};
use reefwatch::config::AppConfig;
use reefwatch::error::AppError;
use reefwatch::gamification::ScoringTable;
use reefwatch::telemetry;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "ReefWatch",
    about = "Score Bahamian reef observations, verifications, and badge awards",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay observation and verification exports through the scoring engine
    Replay(ReplayArgs),
    /// Run a built-in scenario around an Exuma MPA (default command)
    Demo(DemoArgs),
    /// Print the active scoring table as JSON
    Table,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(?config.environment, region = ?config.region, "configuration loaded");

    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));

    match command {
        Command::Replay(args) => run_replay(args, &config),
        Command::Demo(args) => run_demo(args, &config),
        Command::Table => write_table(&config.scoring, std::io::stdout().lock()),
    }
}

fn write_table<W: Write>(table: &ScoringTable, mut out: W) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut out, table)?;
    writeln!(out)?;
    Ok(())
}
