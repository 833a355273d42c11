//! The `report` command.

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::{DateTime, TimeDelta, Utc};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wifiscout_analytics::build_report;

use crate::output::write_json;
use crate::{ARG_DATABASE, ARG_DAYS, ARG_TOP, CliError, database_path, open_store};

/// Window covered by `report` when none is configured.
pub(crate) const DEFAULT_REPORT_DAYS: u32 = 7;
/// Access points ranked at each end when none is configured.
pub(crate) const DEFAULT_REPORT_TOP: usize = 5;

/// CLI arguments for the `report` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "report",
    long_about = "Summarise telemetry captured over the trailing window: \
                 best and worst access points, per-building and per-hour \
                 statistics, and congestion levels.",
    about = "Summarise recent network performance"
)]
#[ortho_config(prefix = "WIFISCOUT")]
pub(crate) struct ReportArgs {
    /// SQLite database holding collected telemetry.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Length of the trailing window in days.
    #[arg(long = ARG_DAYS, value_name = "days")]
    #[serde(default)]
    pub(crate) days: Option<u32>,
    /// Number of access points ranked at each end.
    #[arg(long = ARG_TOP, value_name = "count")]
    #[serde(default)]
    pub(crate) top: Option<usize>,
}

/// Resolved `report` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReportConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) window: TimeDelta,
    pub(crate) top: usize,
}

impl From<ReportArgs> for ReportConfig {
    fn from(args: ReportArgs) -> Self {
        Self {
            database: database_path(args.database),
            window: TimeDelta::days(i64::from(args.days.unwrap_or(DEFAULT_REPORT_DAYS))),
            top: args.top.unwrap_or(DEFAULT_REPORT_TOP),
        }
    }
}

pub(crate) fn run_report(args: ReportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    report_with(&ReportConfig::from(merged), Utc::now(), writer)
}

pub(crate) fn report_with(
    config: &ReportConfig,
    now: DateTime<Utc>,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let store = open_store(&config.database)?;
    let since = now
        .checked_sub_signed(config.window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let records = store.metrics_since(since)?;
    write_json(writer, &build_report(&records, config.top))
}
