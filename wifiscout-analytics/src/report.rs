//! Network-wide report assembly.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Timelike, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use wifiscout_core::metric::latency_as_millis;
use wifiscout_core::quality::{self, Status};
use wifiscout_core::{Assessment, MetricRecord};

use crate::CongestionLevel;
use crate::stats::{Accumulator, mean, sample_std_dev};

/// First and last capture instants covered by a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest capture.
    pub start: DateTime<Utc>,
    /// Latest capture.
    pub end: DateTime<Utc>,
}

/// One access point's latest snapshot, ranked by score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformerSummary {
    /// Access point name.
    pub ap_name: String,
    /// Building housing the access point.
    pub building: String,
    /// Score of the latest snapshot.
    pub quality_score: f64,
    /// Band of the latest snapshot.
    pub status: Status,
    /// Download throughput in Mbps.
    pub download_speed: Option<f64>,
    /// Upload throughput in Mbps.
    pub upload_speed: Option<f64>,
    /// Latency in milliseconds.
    pub latency_ms: Option<f64>,
    /// Connected clients.
    pub connected_users: Option<u32>,
}

/// Statistics over the latest snapshots of a building's access points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingStats {
    /// Number of access points in the building.
    pub access_points: usize,
    /// Mean latest score.
    pub mean_quality_score: f64,
    /// Sample standard deviation of latest scores; absent for a single
    /// access point.
    pub quality_score_std_dev: Option<f64>,
    /// Mean download throughput over access points that reported it.
    pub mean_download_speed: Option<f64>,
    /// Mean upload throughput over access points that reported it.
    pub mean_upload_speed: Option<f64>,
    /// Mean latency in milliseconds over access points that reported it.
    pub mean_latency_ms: Option<f64>,
}

/// Averages over every snapshot captured in one hour of the day (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyAverages {
    /// Number of snapshots in the hour.
    pub samples: usize,
    /// Mean score.
    pub mean_quality_score: f64,
    /// Mean connected clients over snapshots that reported them.
    pub mean_connected_users: Option<f64>,
    /// Mean download throughput over snapshots that reported it.
    pub mean_download_speed: Option<f64>,
}

/// Network-wide means over the latest snapshot of every access point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    /// Mean latest score.
    pub avg_quality_score: f64,
    /// Mean download throughput.
    pub avg_download_speed: Option<f64>,
    /// Mean upload throughput.
    pub avg_upload_speed: Option<f64>,
    /// Mean latency in milliseconds.
    pub avg_latency_ms: Option<f64>,
}

/// Aggregate view of a window of telemetry.
///
/// An empty window yields [`NetworkReport::default`], which has no date
/// range, no rankings and no overall statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkReport {
    /// Snapshots analysed.
    pub total_records: usize,
    /// Capture span of the analysed snapshots.
    pub date_range: Option<DateRange>,
    /// Best access points by latest score, best first.
    pub top_performers: Vec<PerformerSummary>,
    /// Worst access points by latest score, worst first.
    pub worst_performers: Vec<PerformerSummary>,
    /// Per-building statistics keyed by building name.
    pub buildings: BTreeMap<String, BuildingStats>,
    /// Per-hour averages keyed by UTC hour of day.
    pub peak_hours: BTreeMap<u32, HourlyAverages>,
    /// Access point counts per congestion band; access points that never
    /// reported a client count are left out.
    pub congestion: BTreeMap<CongestionLevel, usize>,
    /// Network-wide means.
    pub overall: Option<OverallStats>,
}

impl NetworkReport {
    /// Report whether no snapshots were analysed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

/// Latest snapshot of one access point together with its assessment.
struct Latest<'a> {
    record: &'a MetricRecord,
    assessment: Assessment,
}

impl Latest<'_> {
    fn summary(&self) -> PerformerSummary {
        let measurements = &self.record.measurements;
        PerformerSummary {
            ap_name: self.record.access_point.name.clone(),
            building: self.record.access_point.building.clone(),
            quality_score: self.assessment.score,
            status: self.assessment.status,
            download_speed: measurements.download_mbps,
            upload_speed: measurements.upload_mbps,
            latency_ms: measurements.latency.map(latency_as_millis),
            connected_users: measurements.connected_users,
        }
    }
}

/// Build a report over `records`, ranking `top_n` access points at each
/// end of the score range.
///
/// Access points are identified by name. Rankings, building statistics,
/// congestion and overall means use each access point's latest snapshot;
/// hourly averages use every snapshot.
#[must_use]
pub fn build_report(records: &[MetricRecord], top_n: usize) -> NetworkReport {
    let Some(date_range) = date_range(records) else {
        return NetworkReport::default();
    };

    let mut latest = latest_per_access_point(records);
    latest.sort_by(best_first);

    let top_performers = latest.iter().take(top_n).map(Latest::summary).collect();
    let worst_performers = latest
        .iter()
        .rev()
        .take(top_n)
        .map(Latest::summary)
        .collect();

    debug!(
        "report over {} records from {} access points",
        records.len(),
        latest.len()
    );

    NetworkReport {
        total_records: records.len(),
        date_range: Some(date_range),
        top_performers,
        worst_performers,
        buildings: building_stats(&latest),
        peak_hours: peak_hours(records),
        congestion: congestion(&latest),
        overall: overall(&latest),
    }
}

fn date_range(records: &[MetricRecord]) -> Option<DateRange> {
    let start = records.iter().map(|record| record.captured_at).min()?;
    let end = records.iter().map(|record| record.captured_at).max()?;
    Some(DateRange { start, end })
}

/// Later captures win; among equal captures the later record in the slice
/// wins.
fn latest_per_access_point(records: &[MetricRecord]) -> Vec<Latest<'_>> {
    let mut by_name: BTreeMap<&str, &MetricRecord> = BTreeMap::new();
    for record in records {
        by_name
            .entry(record.access_point.name.as_str())
            .and_modify(|current| {
                if record.captured_at >= current.captured_at {
                    *current = record;
                }
            })
            .or_insert(record);
    }
    by_name
        .into_values()
        .map(|record| Latest {
            record,
            assessment: quality::assess(&record.measurements),
        })
        .collect()
}

/// Score descending, then name ascending.
fn best_first(left: &Latest<'_>, right: &Latest<'_>) -> Ordering {
    right
        .assessment
        .score
        .total_cmp(&left.assessment.score)
        .then_with(|| left.record.access_point.name.cmp(&right.record.access_point.name))
}

fn building_stats(latest: &[Latest<'_>]) -> BTreeMap<String, BuildingStats> {
    let mut grouped: BTreeMap<&str, Vec<&Latest<'_>>> = BTreeMap::new();
    for entry in latest {
        grouped
            .entry(entry.record.access_point.building.as_str())
            .or_default()
            .push(entry);
    }
    grouped
        .into_iter()
        .filter_map(|(building, entries)| {
            let scores: Vec<f64> = entries.iter().map(|entry| entry.assessment.score).collect();
            let stats = BuildingStats {
                access_points: entries.len(),
                mean_quality_score: mean(scores.iter().copied())?,
                quality_score_std_dev: sample_std_dev(&scores),
                mean_download_speed: mean(
                    entries
                        .iter()
                        .filter_map(|entry| entry.record.measurements.download_mbps),
                ),
                mean_upload_speed: mean(
                    entries
                        .iter()
                        .filter_map(|entry| entry.record.measurements.upload_mbps),
                ),
                mean_latency_ms: mean(entries.iter().filter_map(|entry| {
                    entry.record.measurements.latency.map(latency_as_millis)
                })),
            };
            Some((building.to_owned(), stats))
        })
        .collect()
}

#[derive(Default)]
struct HourBucket {
    samples: usize,
    score: Accumulator,
    users: Accumulator,
    download: Accumulator,
}

fn peak_hours(records: &[MetricRecord]) -> BTreeMap<u32, HourlyAverages> {
    let mut buckets: BTreeMap<u32, HourBucket> = BTreeMap::new();
    for record in records {
        let bucket = buckets.entry(record.captured_at.hour()).or_default();
        bucket.samples = bucket.samples.saturating_add(1);
        bucket.score.push(quality::score(&record.measurements));
        bucket
            .users
            .push_present(record.measurements.connected_users.map(f64::from));
        bucket
            .download
            .push_present(record.measurements.download_mbps);
    }
    buckets
        .into_iter()
        .filter_map(|(hour, bucket)| {
            let averages = HourlyAverages {
                samples: bucket.samples,
                mean_quality_score: bucket.score.mean()?,
                mean_connected_users: bucket.users.mean(),
                mean_download_speed: bucket.download.mean(),
            };
            Some((hour, averages))
        })
        .collect()
}

fn congestion(latest: &[Latest<'_>]) -> BTreeMap<CongestionLevel, usize> {
    let mut counts = BTreeMap::new();
    for users in latest
        .iter()
        .filter_map(|entry| entry.record.measurements.connected_users)
    {
        let count: &mut usize = counts.entry(CongestionLevel::classify(users)).or_default();
        *count = count.saturating_add(1);
    }
    counts
}

fn overall(latest: &[Latest<'_>]) -> Option<OverallStats> {
    let measurements = || latest.iter().map(|entry| &entry.record.measurements);
    Some(OverallStats {
        avg_quality_score: mean(latest.iter().map(|entry| entry.assessment.score))?,
        avg_download_speed: mean(measurements().filter_map(|m| m.download_mbps)),
        avg_upload_speed: mean(measurements().filter_map(|m| m.upload_mbps)),
        avg_latency_ms: mean(measurements().filter_map(|m| m.latency.map(latency_as_millis))),
    })
}
