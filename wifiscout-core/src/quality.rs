//! Composite quality scoring for access point telemetry.
//!
//! Every consumer (geospatial queries, trends, reports, the CLI) scores
//! through [`score`] so the formula exists exactly once. Each metric is
//! normalised onto `0..=100` with its own curve and the results are blended
//! with fixed weights:
//!
//! | metric | curve | weight |
//! |---|---|---|
//! | download | linear, saturates at 100 Mbps | 0.35 |
//! | upload | linear, saturates at 50 Mbps | 0.15 |
//! | latency | 0 ms scores 100, 1000 ms or more scores 0 | 0.20 |
//! | connected users | 1.5 points per user, capped at 50 users | 0.20 |
//! | signal | `130 + dBm`, clamped | 0.10 |
//!
//! Absent fields fall back to download 0, upload 0, infinite latency, zero
//! users, and −80 dBm.
//!
//! # Examples
//! ```
//! use std::time::Duration;
//! use wifiscout_core::{Measurements, Status, quality};
//!
//! let perfect = Measurements {
//!     download_mbps: Some(100.0),
//!     upload_mbps: Some(50.0),
//!     latency: Some(Duration::ZERO),
//!     connected_users: Some(0),
//!     signal_dbm: Some(-30.0),
//!     ..Measurements::default()
//! };
//! let assessment = quality::assess(&perfect);
//! assert_eq!(assessment.score, 100.0);
//! assert_eq!(assessment.status, Status::Excellent);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Measurements;
use crate::metric::latency_as_millis;

const DOWNLOAD_SATURATION_MBPS: f64 = 100.0;
const UPLOAD_SATURATION_MBPS: f64 = 50.0;
const LATENCY_CEILING_MS: f64 = 1000.0;
const USER_CAP: u32 = 50;
const USER_PENALTY: f64 = 1.5;
const SIGNAL_OFFSET_DBM: f64 = 130.0;

/// Signal strength assumed when none was reported.
pub const DEFAULT_SIGNAL_DBM: f64 = -80.0;

const WEIGHT_DOWNLOAD: f64 = 0.35;
const WEIGHT_UPLOAD: f64 = 0.15;
const WEIGHT_LATENCY: f64 = 0.20;
const WEIGHT_USERS: f64 = 0.20;
const WEIGHT_SIGNAL: f64 = 0.10;

const SCALE_MAX: f64 = 100.0;

/// Coarse quality band derived from a score.
///
/// Variants are ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Score below 40.
    Poor,
    /// Score in `40..60`.
    Medium,
    /// Score in `60..80`.
    Good,
    /// Score of 80 or more.
    Excellent,
}

impl Status {
    /// Classify a score. Each band includes its lower bound.
    ///
    /// # Examples
    /// ```
    /// use wifiscout_core::Status;
    ///
    /// assert_eq!(Status::from_score(80.0), Status::Excellent);
    /// assert_eq!(Status::from_score(59.99), Status::Medium);
    /// ```
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Medium
        } else {
            Self::Poor
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Poor => "Poor",
            Self::Medium => "Medium",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A score paired with its status band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    /// Quality score in `0..=100`, rounded to two decimals.
    #[serde(rename = "quality_score")]
    pub score: f64,
    /// Band derived from `score`.
    pub status: Status,
}

/// Score telemetry and classify the result.
#[must_use]
pub fn assess(measurements: &Measurements) -> Assessment {
    let value = score(measurements);
    Assessment {
        score: value,
        status: Status::from_score(value),
    }
}

/// Compute the composite quality score in `0..=100`, rounded to two decimals.
#[must_use]
pub fn score(measurements: &Measurements) -> f64 {
    round_hundredths(Components::from(measurements).weighted())
}

/// Round to two decimal places, the precision of every reported score.
#[expect(
    clippy::float_arithmetic,
    reason = "rounding to hundredths scales around `f64::round`"
)]
#[must_use]
pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-metric values on the common `0..=100` scale.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Components {
    download: f64,
    upload: f64,
    latency: f64,
    users: f64,
    signal: f64,
}

impl From<&Measurements> for Components {
    #[expect(
        clippy::float_arithmetic,
        reason = "normalisation curves are linear transforms of the raw metrics"
    )]
    fn from(measurements: &Measurements) -> Self {
        let download = measurements.download_mbps.unwrap_or(0.0);
        let upload = measurements.upload_mbps.unwrap_or(0.0);
        let latency_ms = measurements
            .latency
            .map_or(f64::INFINITY, latency_as_millis);
        let users = measurements.connected_users.unwrap_or(0).min(USER_CAP);
        let signal = measurements.signal_dbm.unwrap_or(DEFAULT_SIGNAL_DBM);

        Self {
            download: to_scale(download / DOWNLOAD_SATURATION_MBPS * SCALE_MAX),
            upload: to_scale(upload / UPLOAD_SATURATION_MBPS * SCALE_MAX),
            latency: to_scale((LATENCY_CEILING_MS - latency_ms.min(LATENCY_CEILING_MS)) / 10.0),
            users: to_scale(SCALE_MAX - f64::from(users) * USER_PENALTY),
            signal: to_scale(SIGNAL_OFFSET_DBM + signal),
        }
    }
}

impl Components {
    #[expect(
        clippy::float_arithmetic,
        reason = "the composite is a weighted sum"
    )]
    fn weighted(self) -> f64 {
        WEIGHT_DOWNLOAD * self.download
            + WEIGHT_UPLOAD * self.upload
            + WEIGHT_LATENCY * self.latency
            + WEIGHT_USERS * self.users
            + WEIGHT_SIGNAL * self.signal
    }
}

/// Clamp onto `0..=100`; NaN contributes nothing.
fn to_scale(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, SCALE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    #[case(100.0, Status::Excellent)]
    #[case(80.0, Status::Excellent)]
    #[case(79.99, Status::Good)]
    #[case(60.0, Status::Good)]
    #[case(59.99, Status::Medium)]
    #[case(40.0, Status::Medium)]
    #[case(39.99, Status::Poor)]
    #[case(0.0, Status::Poor)]
    fn status_bands_include_their_lower_bound(#[case] score: f64, #[case] expected: Status) {
        assert_eq!(Status::from_score(score), expected);
    }

    #[rstest]
    fn status_ordering_runs_from_worst_to_best() {
        assert!(Status::Poor < Status::Medium);
        assert!(Status::Medium < Status::Good);
        assert!(Status::Good < Status::Excellent);
    }

    #[rstest]
    fn latency_components_are_linear_in_milliseconds() {
        let at = |millis: u64| {
            Components::from(&Measurements {
                latency: Some(Duration::from_millis(millis)),
                ..Measurements::default()
            })
            .latency
        };
        assert_eq!(at(0), 100.0);
        assert_eq!(at(500), 50.0);
        assert_eq!(at(1000), 0.0);
        assert_eq!(at(5000), 0.0);
    }

    #[rstest]
    #[case(0, 100.0)]
    #[case(10, 85.0)]
    #[case(50, 25.0)]
    #[case(500, 25.0)]
    fn user_penalty_caps_at_fifty_clients(#[case] users: u32, #[case] expected: f64) {
        let components = Components::from(&Measurements {
            connected_users: Some(users),
            ..Measurements::default()
        });
        assert_eq!(components.users, expected);
    }

    #[rstest]
    #[case(-30.0, 100.0)]
    #[case(-90.0, 40.0)]
    #[case(-140.0, 0.0)]
    #[case(0.0, 100.0)]
    fn signal_curve_is_clamped(#[case] dbm: f64, #[case] expected: f64) {
        let components = Components::from(&Measurements {
            signal_dbm: Some(dbm),
            ..Measurements::default()
        });
        assert_eq!(components.signal, expected);
    }

    #[rstest]
    fn nan_inputs_contribute_nothing() {
        let components = Components::from(&Measurements {
            download_mbps: Some(f64::NAN),
            ..Measurements::default()
        });
        assert_eq!(components.download, 0.0);
    }

    #[rstest]
    #[case(12.344_9, 12.34)]
    #[case(12.345_1, 12.35)]
    #[case(99.999, 100.0)]
    fn rounds_to_hundredths(#[case] raw: f64, #[case] expected: f64) {
        assert!((round_hundredths(raw) - expected).abs() < 1e-9);
    }
}
