use thiserror::Error;
use wifiscout_core::{CoordinateError, LatencyError, StoreError};

/// Errors raised while decoding or validating telemetry submissions.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The payload was not valid JSON for a submission.
    #[error("failed to decode submission payload: {0}")]
    Json(#[from] serde_json::Error),
    /// The access point name was empty or whitespace.
    #[error("submission must name its access point")]
    EmptyName,
    /// Only one of latitude and longitude was supplied.
    #[error("submission for {ap_name} must supply both latitude and longitude or neither")]
    PartialLocation {
        /// Access point named by the submission.
        ap_name: String,
    },
    /// Coordinates were out of range.
    #[error("submission for {ap_name} has invalid coordinates: {source}")]
    Coordinates {
        /// Access point named by the submission.
        ap_name: String,
        /// Validation failure.
        #[source]
        source: CoordinateError,
    },
    /// A metric was negative or non-finite.
    #[error("submission for {ap_name} has invalid {field}: {value}")]
    InvalidMetric {
        /// Access point named by the submission.
        ap_name: String,
        /// Wire name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Latency could not be represented as a duration.
    #[error("submission for {ap_name} has invalid latency: {source}")]
    Latency {
        /// Access point named by the submission.
        ap_name: String,
        /// Conversion failure.
        #[source]
        source: LatencyError,
    },
}

/// Errors raised by the simulated collector.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// A fleet entry carried invalid coordinates.
    #[error("fleet access point {name} has invalid coordinates: {source}")]
    Fleet {
        /// Fleet entry name.
        name: &'static str,
        /// Validation failure.
        #[source]
        source: CoordinateError,
    },
    /// Writing a record to the sink failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The requested history does not fit in a timestamp range.
    #[error("simulated history of {records} records does not fit the timestamp range")]
    HistoryTooLong {
        /// Number of records requested.
        records: u64,
    },
    /// The collector thread could not be spawned.
    #[error("failed to spawn collector thread: {0}")]
    Spawn(#[source] std::io::Error),
    /// The collector thread panicked.
    #[error("collector thread panicked")]
    Panicked,
}
