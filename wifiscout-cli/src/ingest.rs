//! Commands that read or produce telemetry: score, submit and simulate.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, TimeDelta, Utc};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wifiscout_core::{Assessment, MetricRecord, MetricSink, quality};
use wifiscout_data::{DEFAULT_SEED, RoundsOptions, campus_fleet, parse_submissions, run_rounds};

use crate::output::write_json;
use crate::{
    ARG_DATABASE, ARG_PAYLOAD, ARG_ROUNDS, ARG_SEED, CliError, ENV_SCORE_PAYLOAD,
    ENV_SUBMIT_PAYLOAD, database_path, open_store,
};

/// Rounds simulated when none are configured.
pub(crate) const DEFAULT_SIMULATION_ROUNDS: u64 = 10;

/// Gap between simulated snapshots.
const SIMULATION_STEP: TimeDelta = TimeDelta::seconds(2);

/// CLI arguments for the `score` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "score",
    long_about = "Score one submission object or an array of them. The \
                 payload uses the same JSON shape as `submit` and nothing \
                 is stored.",
    about = "Score a telemetry payload without storing it"
)]
#[ortho_config(prefix = "WIFISCOUT")]
pub(crate) struct ScoreArgs {
    /// Path to a JSON submission payload.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) payload_path: Option<Utf8PathBuf>,
}

/// CLI arguments for the `submit` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "submit",
    about = "Store one submission object or an array of them"
)]
#[ortho_config(prefix = "WIFISCOUT")]
pub(crate) struct SubmitArgs {
    /// Path to a JSON submission payload.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) payload_path: Option<Utf8PathBuf>,
    /// SQLite database receiving the telemetry.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

/// CLI arguments for the `simulate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "simulate",
    long_about = "Write simulated telemetry for every access point of the \
                 demonstration campus. Snapshots are two seconds apart and \
                 the last one is stamped with the current time.",
    about = "Backfill simulated campus telemetry"
)]
#[ortho_config(prefix = "WIFISCOUT")]
pub(crate) struct SimulateArgs {
    /// SQLite database receiving the telemetry.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Number of passes over the campus.
    #[arg(long = ARG_ROUNDS, value_name = "count")]
    #[serde(default)]
    pub(crate) rounds: Option<u64>,
    /// Seed for the measurement generator.
    #[arg(long = ARG_SEED, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
}

/// Resolved `submit` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubmitConfig {
    pub(crate) payload_path: Utf8PathBuf,
    pub(crate) database: Utf8PathBuf,
}

/// Resolved `simulate` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SimulateConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) rounds: u64,
    pub(crate) seed: u64,
}

/// Assessment of one scored submission.
#[derive(Debug, Serialize)]
struct ScoredSubmission {
    ap_name: String,
    #[serde(flatten)]
    assessment: Assessment,
}

/// Outcome of a `submit` run.
#[derive(Debug, Serialize)]
struct SubmitSummary {
    accepted: usize,
    access_point_ids: Vec<u64>,
}

/// Outcome of a `simulate` run.
#[derive(Debug, Serialize)]
struct SimulateSummary {
    records_written: u64,
    access_points: usize,
    seed: u64,
}

impl TryFrom<SubmitArgs> for SubmitConfig {
    type Error = CliError;

    fn try_from(args: SubmitArgs) -> Result<Self, Self::Error> {
        let payload_path = args.payload_path.ok_or(CliError::MissingArgument {
            field: ARG_PAYLOAD,
            env: ENV_SUBMIT_PAYLOAD,
        })?;
        Ok(Self {
            payload_path,
            database: database_path(args.database),
        })
    }
}

impl From<SimulateArgs> for SimulateConfig {
    fn from(args: SimulateArgs) -> Self {
        Self {
            database: database_path(args.database),
            rounds: args.rounds.unwrap_or(DEFAULT_SIMULATION_ROUNDS),
            seed: args.seed.unwrap_or(DEFAULT_SEED),
        }
    }
}

/// Read, decode and validate every submission in a payload file.
pub(crate) fn load_records(
    path: &Utf8Path,
    received_at: DateTime<Utc>,
) -> Result<Vec<MetricRecord>, CliError> {
    let payload =
        wifiscout_core::fs::read_to_string(path).map_err(|source| CliError::ReadPayload {
            path: path.to_path_buf(),
            source,
        })?;
    let invalid = |source| CliError::InvalidSubmission {
        path: path.to_path_buf(),
        source,
    };
    parse_submissions(&payload)
        .map_err(invalid)?
        .into_iter()
        .map(|submission| submission.into_record(received_at).map_err(invalid))
        .collect()
}

pub(crate) fn run_score(args: ScoreArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let path = merged.payload_path.ok_or(CliError::MissingArgument {
        field: ARG_PAYLOAD,
        env: ENV_SCORE_PAYLOAD,
    })?;
    score_with(&path, writer)
}

pub(crate) fn score_with(path: &Utf8Path, writer: &mut dyn Write) -> Result<(), CliError> {
    let scored: Vec<ScoredSubmission> = load_records(path, Utc::now())?
        .into_iter()
        .map(|record| ScoredSubmission {
            assessment: quality::assess(&record.measurements),
            ap_name: record.access_point.name,
        })
        .collect();
    write_json(writer, &scored)
}

pub(crate) fn run_submit(args: SubmitArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    submit_with(&SubmitConfig::try_from(merged)?, writer)
}

/// Validate the whole payload before storing any of it.
pub(crate) fn submit_with(config: &SubmitConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let records = load_records(&config.payload_path, Utc::now())?;
    let store = open_store(&config.database)?;
    let access_point_ids = records
        .iter()
        .map(|record| store.record(record))
        .collect::<Result<Vec<_>, _>>()?;
    info!(
        "stored {} submissions from {}",
        records.len(),
        config.payload_path
    );
    write_json(
        writer,
        &SubmitSummary {
            accepted: records.len(),
            access_point_ids,
        },
    )
}

pub(crate) fn run_simulate(args: SimulateArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    simulate_with(&SimulateConfig::from(merged), Utc::now(), writer)
}

pub(crate) fn simulate_with(
    config: &SimulateConfig,
    end: DateTime<Utc>,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let fleet = campus_fleet()?;
    let store = open_store(&config.database)?;
    let options = RoundsOptions {
        rounds: config.rounds,
        seed: config.seed,
        end,
        step: SIMULATION_STEP,
    };
    let records_written = run_rounds(&store, &fleet, options)?;
    info!("simulated {records_written} snapshots into {}", config.database);
    write_json(
        writer,
        &SimulateSummary {
            records_written,
            access_points: fleet.len(),
            seed: config.seed,
        },
    )
}
