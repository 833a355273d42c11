//! Command-line interface for the wifiscout engine.
//!
//! Every subcommand reads its options from CLI flags, `WIFISCOUT_CMDS_*`
//! environment variables and configuration files via `ortho_config`, then
//! writes its result to stdout as pretty-printed JSON.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use wifiscout_core::SqliteMetricStore;

mod error;
mod ingest;
mod output;
mod query;
mod report;

pub use error::CliError;

use ingest::{ScoreArgs, SimulateArgs, SubmitArgs};
use query::{CurrentArgs, ListArgs, NearbyArgs, RecommendArgs, ShowArgs, TrendArgs};
use report::ReportArgs;

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_LATITUDE: &str = "latitude";
pub(crate) const ARG_LONGITUDE: &str = "longitude";
pub(crate) const ARG_RADIUS: &str = "radius";
pub(crate) const ARG_CURRENT_RADIUS: &str = "current-radius";
pub(crate) const ARG_LIMIT: &str = "limit";
pub(crate) const ARG_ACCESS_POINT: &str = "access-point";
pub(crate) const ARG_HOURS: &str = "hours";
pub(crate) const ARG_PAYLOAD: &str = "payload";
pub(crate) const ARG_ROUNDS: &str = "rounds";
pub(crate) const ARG_SEED: &str = "seed";
pub(crate) const ARG_DAYS: &str = "days";
pub(crate) const ARG_TOP: &str = "top";

pub(crate) const ENV_SCORE_PAYLOAD: &str = "WIFISCOUT_CMDS_SCORE_PAYLOAD_PATH";
pub(crate) const ENV_SUBMIT_PAYLOAD: &str = "WIFISCOUT_CMDS_SUBMIT_PAYLOAD_PATH";
pub(crate) const ENV_NEARBY_LATITUDE: &str = "WIFISCOUT_CMDS_NEARBY_LATITUDE";
pub(crate) const ENV_NEARBY_LONGITUDE: &str = "WIFISCOUT_CMDS_NEARBY_LONGITUDE";
pub(crate) const ENV_CURRENT_LATITUDE: &str = "WIFISCOUT_CMDS_CURRENT_LATITUDE";
pub(crate) const ENV_CURRENT_LONGITUDE: &str = "WIFISCOUT_CMDS_CURRENT_LONGITUDE";
pub(crate) const ENV_RECOMMEND_LATITUDE: &str = "WIFISCOUT_CMDS_RECOMMEND_LATITUDE";
pub(crate) const ENV_RECOMMEND_LONGITUDE: &str = "WIFISCOUT_CMDS_RECOMMEND_LONGITUDE";
pub(crate) const ENV_TREND_ACCESS_POINT: &str = "WIFISCOUT_CMDS_TREND_ACCESS_POINT";
pub(crate) const ENV_SHOW_ACCESS_POINT: &str = "WIFISCOUT_CMDS_SHOW_ACCESS_POINT";

/// Database used when none is configured.
pub(crate) const DEFAULT_DATABASE: &str = "wifi_data.db";

/// Run the wifiscout CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, or the
/// command itself fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    execute(cli.command, &mut stdout)
}

fn execute(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Score(args) => ingest::run_score(args, writer),
        Command::Submit(args) => ingest::run_submit(args, writer),
        Command::Simulate(args) => ingest::run_simulate(args, writer),
        Command::Nearby(args) => query::run_nearby(args, writer),
        Command::Current(args) => query::run_current(args, writer),
        Command::Recommend(args) => query::run_recommend(args, writer),
        Command::Trend(args) => query::run_trend(args, writer),
        Command::Show(args) => query::run_show(args, writer),
        Command::List(args) => query::run_list(args, writer),
        Command::Report(args) => report::run_report(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "wifiscout",
    about = "Score Wi-Fi access points and recommend better ones nearby",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a telemetry payload without storing it.
    Score(ScoreArgs),
    /// Store a telemetry payload.
    Submit(SubmitArgs),
    /// Backfill simulated telemetry for the demonstration campus.
    Simulate(SimulateArgs),
    /// List scored access points around a position.
    Nearby(NearbyArgs),
    /// Identify the access point at a position.
    Current(CurrentArgs),
    /// Recommend better access points near a position.
    Recommend(RecommendArgs),
    /// Show the scored history of one access point.
    Trend(TrendArgs),
    /// Show one access point with its latest assessment.
    Show(ShowArgs),
    /// List every access point with its latest assessment.
    List(ListArgs),
    /// Summarise recent network performance.
    Report(ReportArgs),
}

/// Resolve the configured database path, falling back to the default.
pub(crate) fn database_path(configured: Option<Utf8PathBuf>) -> Utf8PathBuf {
    configured.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE))
}

pub(crate) fn open_store(path: &Utf8Path) -> Result<SqliteMetricStore, CliError> {
    Ok(SqliteMetricStore::open(path)?)
}

#[cfg(test)]
mod tests;
