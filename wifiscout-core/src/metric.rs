//! Metric records: timestamped performance snapshots for one access point.
//!
//! Every performance field is optional. Absent values are never coerced to
//! zero here; the quality scorer applies its documented defaults instead.
//! Latency travels as a [`Duration`] so no caller has to guess whether a bare
//! number means seconds or milliseconds. On the wire and in storage it is
//! expressed in milliseconds (`latency_ms`).

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::AccessPoint;

/// Raw telemetry captured for an access point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurements {
    /// Download throughput in Mbps.
    #[serde(default, rename = "download_speed")]
    pub download_mbps: Option<f64>,
    /// Upload throughput in Mbps.
    #[serde(default, rename = "upload_speed")]
    pub upload_mbps: Option<f64>,
    /// Round-trip latency.
    #[serde(default, rename = "latency_ms", with = "latency_millis")]
    pub latency: Option<Duration>,
    /// Number of concurrently connected clients.
    #[serde(default)]
    pub connected_users: Option<u32>,
    /// Received signal strength in dBm, typically `-90..=-30`.
    #[serde(default, rename = "signal_strength")]
    pub signal_dbm: Option<f64>,
    /// Packet loss percentage. Carried for reporting, not scored.
    #[serde(default)]
    pub packet_loss: Option<f64>,
    /// Bandwidth usage percentage. Carried for reporting, not scored.
    #[serde(default)]
    pub bandwidth_usage: Option<f64>,
}

/// One measurement snapshot belonging to exactly one access point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Access point the snapshot belongs to.
    #[serde(flatten)]
    pub access_point: AccessPoint,
    /// Captured telemetry.
    #[serde(flatten)]
    pub measurements: Measurements,
    /// Capture instant.
    #[serde(rename = "timestamp")]
    pub captured_at: DateTime<Utc>,
}

impl MetricRecord {
    /// Bundle an access point with a snapshot of its telemetry.
    #[must_use]
    pub const fn new(
        access_point: AccessPoint,
        measurements: Measurements,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_point,
            measurements,
            captured_at,
        }
    }
}

/// Error raised when a millisecond latency cannot become a [`Duration`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("latency {0} ms must be finite and non-negative")]
pub struct LatencyError(pub f64);

/// Convert a latency expressed in milliseconds into a [`Duration`].
///
/// # Errors
/// Returns [`LatencyError`] for negative, non-finite, or overflowing input.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use wifiscout_core::metric::latency_from_millis;
///
/// assert_eq!(latency_from_millis(250.0), Ok(Duration::from_millis(250)));
/// assert!(latency_from_millis(-1.0).is_err());
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "milliseconds are scaled to seconds for Duration construction"
)]
pub fn latency_from_millis(millis: f64) -> Result<Duration, LatencyError> {
    Duration::try_from_secs_f64(millis / 1000.0).map_err(|_| LatencyError(millis))
}

/// Express a latency in fractional milliseconds.
#[expect(
    clippy::float_arithmetic,
    reason = "seconds are scaled to milliseconds"
)]
#[must_use]
pub fn latency_as_millis(latency: Duration) -> f64 {
    latency.as_secs_f64() * 1000.0
}

/// Serde adapter encoding `Option<Duration>` as optional milliseconds.
pub(crate) mod latency_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::{latency_as_millis, latency_from_millis};

    #[expect(
        clippy::ref_option,
        reason = "serde's `with` protocol passes the field by reference"
    )]
    pub(crate) fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(latency) => serializer.serialize_some(&latency_as_millis(*latency)),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<f64>::deserialize(deserializer)?
            .map(latency_from_millis)
            .transpose()
            .map_err(D::Error::custom)
    }
}
