//! Error types emitted by the wifiscout CLI.
//!
//! Keep this error type reasonably small, as every command returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use wifiscout_core::{AdvisorError, SqliteMetricStoreError, StoreError};
use wifiscout_data::{CollectorError, SubmissionError};

/// Errors emitted by the wifiscout CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Long option name without the leading dashes.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// Opening the metrics database failed.
    #[error(transparent)]
    OpenDatabase(#[from] SqliteMetricStoreError),
    /// Reading a payload file failed.
    #[error("failed to read payload at {path:?}: {source}")]
    ReadPayload {
        /// Location of the payload file.
        path: Utf8PathBuf,
        /// Source error from the filesystem.
        #[source]
        source: std::io::Error,
    },
    /// A payload file held an invalid submission.
    #[error("invalid submission in {path:?}: {source}")]
    InvalidSubmission {
        /// Location of the payload file.
        path: Utf8PathBuf,
        /// Validation failure for the first rejected submission.
        #[source]
        source: SubmissionError,
    },
    /// No access point carries the requested identifier.
    #[error("access point {id} not found")]
    AccessPointNotFound {
        /// Identifier that was looked up.
        id: u64,
    },
    /// A query against the advisor failed.
    #[error(transparent)]
    Advisor(#[from] AdvisorError),
    /// Reading or writing the metric store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Simulated collection failed.
    #[error(transparent)]
    Collector(#[from] CollectorError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
