//! Telemetry submissions as posted by field collectors.
//!
//! A submission is the flat JSON object a collector sends for one access
//! point. Payloads may carry a single object or an array of them.
//!
//! # Examples
//! ```
//! use chrono::Utc;
//! use wifiscout_data::parse_submissions;
//!
//! let payload = r#"{
//!     "ap_name": "FOOD_STREET_01",
//!     "building": "Food Street",
//!     "floor": 1,
//!     "latitude": 40.7140,
//!     "longitude": -74.0090,
//!     "download_speed": 48.2,
//!     "latency_ms": 35
//! }"#;
//! let submissions = parse_submissions(payload).expect("decode payload");
//! let record = submissions
//!     .into_iter()
//!     .next()
//!     .expect("one submission")
//!     .into_record(Utc::now())
//!     .expect("valid submission");
//! assert_eq!(record.access_point.name, "FOOD_STREET_01");
//! assert!(record.access_point.location.is_some());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wifiscout_core::metric::latency_from_millis;
use wifiscout_core::{AccessPoint, GeoPoint, Measurements, MetricRecord};

use crate::SubmissionError;

/// One telemetry snapshot as submitted over the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricSubmission {
    /// Unique access point name.
    pub ap_name: String,
    /// Building housing the access point.
    #[serde(default)]
    pub building: String,
    /// Floor number.
    #[serde(default)]
    pub floor: i32,
    /// Free-form room label.
    #[serde(default)]
    pub room_number: String,
    /// Latitude in decimal degrees.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Download throughput in Mbps.
    #[serde(default)]
    pub download_speed: Option<f64>,
    /// Upload throughput in Mbps.
    #[serde(default)]
    pub upload_speed: Option<f64>,
    /// Round-trip latency in milliseconds.
    #[serde(default, alias = "latency")]
    pub latency_ms: Option<f64>,
    /// Packet loss percentage.
    #[serde(default)]
    pub packet_loss: Option<f64>,
    /// Number of connected clients.
    #[serde(default)]
    pub connected_users: Option<u32>,
    /// Signal strength in dBm.
    #[serde(default)]
    pub signal_strength: Option<f64>,
    /// Bandwidth usage percentage.
    #[serde(default)]
    pub bandwidth_usage: Option<f64>,
    /// Capture instant; the receive time is used when absent.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Decode a payload holding one submission object or an array of them.
///
/// # Errors
/// Returns [`SubmissionError::Json`] when the payload is not valid JSON or
/// an element does not match the submission shape.
pub fn parse_submissions(payload: &str) -> Result<Vec<MetricSubmission>, SubmissionError> {
    match serde_json::from_str::<Value>(payload)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(SubmissionError::from))
            .collect(),
        single => Ok(vec![serde_json::from_value(single)?]),
    }
}

impl MetricSubmission {
    /// Validate the submission and convert it into a metric record.
    ///
    /// `received_at` stamps submissions that carry no timestamp.
    ///
    /// # Errors
    /// Returns [`SubmissionError`] when the name is empty, the location is
    /// partial or out of range, or a metric is negative or non-finite.
    pub fn into_record(self, received_at: DateTime<Utc>) -> Result<MetricRecord, SubmissionError> {
        let ap_name = self.ap_name.trim().to_owned();
        if ap_name.is_empty() {
            return Err(SubmissionError::EmptyName);
        }

        let location = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(
                GeoPoint::new(latitude, longitude).map_err(|source| {
                    SubmissionError::Coordinates {
                        ap_name: ap_name.clone(),
                        source,
                    }
                })?,
            ),
            (None, None) => None,
            _ => return Err(SubmissionError::PartialLocation { ap_name }),
        };

        let check = |field: &'static str, value: Option<f64>| {
            non_negative(&ap_name, field, value)
        };
        let download_mbps = check("download_speed", self.download_speed)?;
        let upload_mbps = check("upload_speed", self.upload_speed)?;
        let latency_ms = check("latency_ms", self.latency_ms)?;
        let packet_loss = check("packet_loss", self.packet_loss)?;
        let bandwidth_usage = check("bandwidth_usage", self.bandwidth_usage)?;
        if let Some(signal) = self.signal_strength.filter(|signal| !signal.is_finite()) {
            return Err(SubmissionError::InvalidMetric {
                ap_name,
                field: "signal_strength",
                value: signal,
            });
        }
        let latency = latency_ms
            .map(latency_from_millis)
            .transpose()
            .map_err(|source| SubmissionError::Latency {
                ap_name: ap_name.clone(),
                source,
            })?;

        let mut access_point = AccessPoint::new(ap_name)
            .in_building(self.building, self.floor)
            .in_room(self.room_number);
        access_point.location = location;

        let measurements = Measurements {
            download_mbps,
            upload_mbps,
            latency,
            connected_users: self.connected_users,
            signal_dbm: self.signal_strength,
            packet_loss,
            bandwidth_usage,
        };
        Ok(MetricRecord::new(
            access_point,
            measurements,
            self.timestamp.unwrap_or(received_at),
        ))
    }
}

fn non_negative(
    ap_name: &str,
    field: &'static str,
    value: Option<f64>,
) -> Result<Option<f64>, SubmissionError> {
    match value {
        Some(number) if !number.is_finite() || number < 0.0 => {
            Err(SubmissionError::InvalidMetric {
                ap_name: ap_name.to_owned(),
                field,
                value: number,
            })
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use std::time::Duration;

    #[fixture]
    fn received_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[fixture]
    fn submission() -> MetricSubmission {
        MetricSubmission {
            ap_name: "ROCK_PLAZA_01".into(),
            building: "Rock Plaza".into(),
            floor: 1,
            room_number: "Main Plaza".into(),
            latitude: Some(40.7150),
            longitude: Some(-74.0075),
            download_speed: Some(64.0),
            upload_speed: Some(22.5),
            latency_ms: Some(18.0),
            connected_users: Some(12),
            signal_strength: Some(-61.0),
            ..MetricSubmission::default()
        }
    }

    #[rstest]
    fn converts_into_a_located_record(submission: MetricSubmission, received_at: DateTime<Utc>) {
        let record = submission.into_record(received_at).expect("valid submission");
        assert_eq!(record.access_point.room, "Main Plaza");
        assert_eq!(record.measurements.latency, Some(Duration::from_millis(18)));
        assert_eq!(record.captured_at, received_at);
        assert!(record.access_point.id.is_none());
    }

    #[rstest]
    fn explicit_timestamps_win(mut submission: MetricSubmission, received_at: DateTime<Utc>) {
        let captured = received_at - chrono::TimeDelta::minutes(5);
        submission.timestamp = Some(captured);
        let record = submission.into_record(received_at).expect("valid submission");
        assert_eq!(record.captured_at, captured);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn rejects_blank_names(
        mut submission: MetricSubmission,
        received_at: DateTime<Utc>,
        #[case] name: &str,
    ) {
        submission.ap_name = name.into();
        assert!(matches!(
            submission.into_record(received_at),
            Err(SubmissionError::EmptyName)
        ));
    }

    #[rstest]
    fn rejects_partial_locations(mut submission: MetricSubmission, received_at: DateTime<Utc>) {
        submission.longitude = None;
        assert!(matches!(
            submission.into_record(received_at),
            Err(SubmissionError::PartialLocation { .. })
        ));
    }

    #[rstest]
    fn missing_location_yields_unlocated_record(
        mut submission: MetricSubmission,
        received_at: DateTime<Utc>,
    ) {
        submission.latitude = None;
        submission.longitude = None;
        let record = submission.into_record(received_at).expect("valid submission");
        assert!(record.access_point.location.is_none());
    }

    #[rstest]
    #[case("download_speed", MetricSubmission { download_speed: Some(-1.0), ..MetricSubmission::default() })]
    #[case("upload_speed", MetricSubmission { upload_speed: Some(f64::NAN), ..MetricSubmission::default() })]
    #[case("latency_ms", MetricSubmission { latency_ms: Some(-3.0), ..MetricSubmission::default() })]
    #[case("signal_strength", MetricSubmission { signal_strength: Some(f64::NEG_INFINITY), ..MetricSubmission::default() })]
    fn rejects_invalid_metrics(
        received_at: DateTime<Utc>,
        #[case] expected_field: &str,
        #[case] overrides: MetricSubmission,
    ) {
        let candidate = MetricSubmission {
            ap_name: "AP".into(),
            ..overrides
        };
        match candidate.into_record(received_at) {
            Err(SubmissionError::InvalidMetric { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected invalid metric, got {other:?}"),
        }
    }

    #[rstest]
    fn parses_single_objects_and_arrays() {
        let single = parse_submissions(r#"{"ap_name": "A"}"#).expect("single");
        assert_eq!(single.len(), 1);

        let many = parse_submissions(r#"[{"ap_name": "A"}, {"ap_name": "B", "latency": 12}]"#)
            .expect("array");
        assert_eq!(many.len(), 2);
        assert_eq!(many.get(1).and_then(|s| s.latency_ms), Some(12.0));
    }

    #[rstest]
    fn reports_malformed_payloads() {
        assert!(matches!(
            parse_submissions(r#"{"building": "no name"}"#),
            Err(SubmissionError::Json(_))
        ));
    }
}
