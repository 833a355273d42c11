//! Read-only queries: nearby, current, recommend, trend, show and list.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::TimeDelta;
use clap::Parser;
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wifiscout_core::{
    Advisor, AdvisorConfig, AdvisorError, DEFAULT_CURRENT_RADIUS_M, DEFAULT_RECOMMENDATION_LIMIT,
    DEFAULT_SEARCH_RADIUS_M, GeoPoint, ScoredCandidate,
};

use crate::output::write_json;
use crate::{
    ARG_ACCESS_POINT, ARG_CURRENT_RADIUS, ARG_DATABASE, ARG_HOURS, ARG_LATITUDE, ARG_LIMIT,
    ARG_LONGITUDE, ARG_RADIUS, CliError, ENV_CURRENT_LATITUDE, ENV_CURRENT_LONGITUDE,
    ENV_NEARBY_LATITUDE, ENV_NEARBY_LONGITUDE, ENV_RECOMMEND_LATITUDE, ENV_RECOMMEND_LONGITUDE,
    ENV_SHOW_ACCESS_POINT, ENV_TREND_ACCESS_POINT, database_path, open_store,
};

/// Trailing window used by `trend` when none is configured.
pub(crate) const DEFAULT_TREND_HOURS: u32 = 24;

/// CLI arguments for the `nearby` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "nearby",
    about = "List scored access points around a position, best first"
)]
#[ortho_config(prefix = "WIFISCOUT")]
pub(crate) struct NearbyArgs {
    /// SQLite database holding collected telemetry.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Latitude of the user in decimal degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Longitude of the user in decimal degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Search radius in meters.
    #[arg(long = ARG_RADIUS, value_name = "meters")]
    #[serde(default)]
    pub(crate) radius: Option<f64>,
}

/// CLI arguments for the `current` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "current",
    about = "Identify the access point the user is connected to"
)]
#[ortho_config(prefix = "WIFISCOUT")]
pub(crate) struct CurrentArgs {
    /// SQLite database holding collected telemetry.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Latitude of the user in decimal degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Longitude of the user in decimal degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Maximum distance in meters to the current access point.
    #[arg(long = ARG_RADIUS, value_name = "meters")]
    #[serde(default)]
    pub(crate) radius: Option<f64>,
}

/// CLI arguments for the `recommend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "recommend",
    long_about = "Compare the access point at the user's position with the \
                 best-scoring alternatives within the search radius and \
                 explain whether moving is worthwhile.",
    about = "Recommend better access points near a position"
)]
#[ortho_config(prefix = "WIFISCOUT")]
pub(crate) struct RecommendArgs {
    /// SQLite database holding collected telemetry.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Latitude of the user in decimal degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Longitude of the user in decimal degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Search radius for alternatives in meters.
    #[arg(long = ARG_RADIUS, value_name = "meters")]
    #[serde(default)]
    pub(crate) radius: Option<f64>,
    /// Maximum number of alternatives to return.
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Maximum distance in meters to the current access point.
    #[arg(long = ARG_CURRENT_RADIUS, value_name = "meters")]
    #[serde(default)]
    pub(crate) current_radius: Option<f64>,
}

/// CLI arguments for the `trend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "trend", about = "Show the scored history of one access point")]
#[ortho_config(prefix = "WIFISCOUT")]
pub(crate) struct TrendArgs {
    /// SQLite database holding collected telemetry.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Identifier of the access point.
    #[arg(long = ARG_ACCESS_POINT, value_name = "id")]
    #[serde(default)]
    pub(crate) access_point: Option<u64>,
    /// Length of the trailing window in hours.
    #[arg(long = ARG_HOURS, value_name = "hours")]
    #[serde(default)]
    pub(crate) hours: Option<u32>,
}

/// CLI arguments for the `show` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "show",
    about = "Show one access point with its latest score"
)]
#[ortho_config(prefix = "WIFISCOUT")]
pub(crate) struct ShowArgs {
    /// SQLite database holding collected telemetry.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Identifier of the access point.
    #[arg(long = ARG_ACCESS_POINT, value_name = "id")]
    #[serde(default)]
    pub(crate) access_point: Option<u64>,
}

/// CLI arguments for the `list` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "list",
    long_about = "List every access point that has reported metrics, with \
                 the assessment of its latest snapshot.",
    about = "List every access point with its latest score"
)]
#[ortho_config(prefix = "WIFISCOUT")]
pub(crate) struct ListArgs {
    /// SQLite database holding collected telemetry.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

/// A resolved position query shared by `nearby` and `current`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PositionConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    pub(crate) radius_m: f64,
}

/// Resolved `recommend` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecommendConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    pub(crate) advisor: AdvisorConfig,
}

/// Resolved `trend` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TrendConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) access_point: u64,
    pub(crate) window: TimeDelta,
}

/// Resolved `show` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShowConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) access_point: u64,
}

/// Output of the `current` subcommand.
#[derive(Debug, Serialize)]
struct CurrentLocation {
    user_location: GeoPoint,
    current_ap: Option<ScoredCandidate>,
}

fn required<T>(value: Option<T>, field: &'static str, env: &'static str) -> Result<T, CliError> {
    value.ok_or(CliError::MissingArgument { field, env })
}

impl NearbyArgs {
    pub(crate) fn into_config(self) -> Result<PositionConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PositionConfig::try_from(merged)
    }
}

impl TryFrom<NearbyArgs> for PositionConfig {
    type Error = CliError;

    fn try_from(args: NearbyArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            latitude: required(args.latitude, ARG_LATITUDE, ENV_NEARBY_LATITUDE)?,
            longitude: required(args.longitude, ARG_LONGITUDE, ENV_NEARBY_LONGITUDE)?,
            radius_m: args.radius.unwrap_or(DEFAULT_SEARCH_RADIUS_M),
            database: database_path(args.database),
        })
    }
}

impl CurrentArgs {
    pub(crate) fn into_config(self) -> Result<PositionConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PositionConfig::try_from(merged)
    }
}

impl TryFrom<CurrentArgs> for PositionConfig {
    type Error = CliError;

    fn try_from(args: CurrentArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            latitude: required(args.latitude, ARG_LATITUDE, ENV_CURRENT_LATITUDE)?,
            longitude: required(args.longitude, ARG_LONGITUDE, ENV_CURRENT_LONGITUDE)?,
            radius_m: args.radius.unwrap_or(DEFAULT_CURRENT_RADIUS_M),
            database: database_path(args.database),
        })
    }
}

impl RecommendArgs {
    pub(crate) fn into_config(self) -> Result<RecommendConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RecommendConfig::try_from(merged)
    }
}

impl TryFrom<RecommendArgs> for RecommendConfig {
    type Error = CliError;

    fn try_from(args: RecommendArgs) -> Result<Self, Self::Error> {
        let latitude = required(args.latitude, ARG_LATITUDE, ENV_RECOMMEND_LATITUDE)?;
        let longitude = required(args.longitude, ARG_LONGITUDE, ENV_RECOMMEND_LONGITUDE)?;
        let advisor = AdvisorConfig {
            current_radius_m: args.current_radius.unwrap_or(DEFAULT_CURRENT_RADIUS_M),
            search_radius_m: args.radius.unwrap_or(DEFAULT_SEARCH_RADIUS_M),
            recommendation_limit: args.limit.unwrap_or(DEFAULT_RECOMMENDATION_LIMIT),
        };
        Ok(Self {
            database: database_path(args.database),
            latitude,
            longitude,
            advisor,
        })
    }
}

impl TrendArgs {
    pub(crate) fn into_config(self) -> Result<TrendConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TrendConfig::try_from(merged)
    }
}

impl TryFrom<TrendArgs> for TrendConfig {
    type Error = CliError;

    fn try_from(args: TrendArgs) -> Result<Self, Self::Error> {
        let access_point = required(args.access_point, ARG_ACCESS_POINT, ENV_TREND_ACCESS_POINT)?;
        let hours = args.hours.unwrap_or(DEFAULT_TREND_HOURS);
        Ok(Self {
            database: database_path(args.database),
            access_point,
            window: TimeDelta::hours(i64::from(hours)),
        })
    }
}

impl ShowArgs {
    pub(crate) fn into_config(self) -> Result<ShowConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ShowConfig::try_from(merged)
    }
}

impl TryFrom<ShowArgs> for ShowConfig {
    type Error = CliError;

    fn try_from(args: ShowArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            access_point: required(args.access_point, ARG_ACCESS_POINT, ENV_SHOW_ACCESS_POINT)?,
            database: database_path(args.database),
        })
    }
}

pub(crate) fn run_nearby(args: NearbyArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    nearby_with(&args.into_config()?, writer)
}

pub(crate) fn nearby_with(config: &PositionConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let advisor = Advisor::new(open_store(&config.database)?);
    let nearby = advisor.find_nearby(config.latitude, config.longitude, config.radius_m)?;
    debug!("{} access points within {} m", nearby.len(), config.radius_m);
    write_json(writer, &nearby)
}

pub(crate) fn run_current(args: CurrentArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    current_with(&args.into_config()?, writer)
}

pub(crate) fn current_with(
    config: &PositionConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let user_location = GeoPoint::new(config.latitude, config.longitude)
        .map_err(AdvisorError::from)?;
    let advisor = Advisor::new(open_store(&config.database)?);
    let current_ap =
        advisor.current_location_within(config.latitude, config.longitude, config.radius_m)?;
    write_json(
        writer,
        &CurrentLocation {
            user_location,
            current_ap,
        },
    )
}

pub(crate) fn run_recommend(args: RecommendArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    recommend_with(&args.into_config()?, writer)
}

pub(crate) fn recommend_with(
    config: &RecommendConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let advisor = Advisor::with_config(open_store(&config.database)?, config.advisor);
    let result = advisor.recommend_default(config.latitude, config.longitude)?;
    write_json(writer, &result)
}

pub(crate) fn run_trend(args: TrendArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    trend_with(&args.into_config()?, writer)
}

pub(crate) fn trend_with(config: &TrendConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let advisor = Advisor::new(open_store(&config.database)?);
    let history = advisor.trend(config.access_point, config.window)?;
    write_json(writer, &history)
}

pub(crate) fn run_show(args: ShowArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    show_with(&args.into_config()?, writer)
}

pub(crate) fn show_with(config: &ShowConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let advisor = Advisor::new(open_store(&config.database)?);
    let id = config.access_point;
    let found = advisor
        .access_point(id)?
        .ok_or(CliError::AccessPointNotFound { id })?;
    write_json(writer, &found)
}

pub(crate) fn run_list(args: ListArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    list_with(&database_path(merged.database), writer)
}

pub(crate) fn list_with(database: &Utf8Path, writer: &mut dyn Write) -> Result<(), CliError> {
    let store = open_store(database)?;
    let assessed: Vec<ScoredCandidate> = store
        .latest_metrics()?
        .into_iter()
        .map(ScoredCandidate::assess)
        .collect();
    write_json(writer, &assessed)
}
