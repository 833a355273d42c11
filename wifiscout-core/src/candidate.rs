//! Access points scored for a single query.

use serde::Serialize;

use crate::quality::{self, Status, round_hundredths};
use crate::{AccessPoint, MetricRecord};

/// A metric record annotated for one query.
///
/// Candidates are rebuilt on every call and never persisted. `distance_m`
/// is present for geospatial results and absent for trend entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    /// Latest (or historical) record the candidate was built from.
    #[serde(flatten)]
    pub record: MetricRecord,
    /// Great-circle distance from the query origin in meters, two decimals.
    #[serde(rename = "distance", skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    /// Composite quality score, two decimals.
    pub quality_score: f64,
    /// Band derived from `quality_score`.
    pub status: Status,
}

impl ScoredCandidate {
    /// Score a record without a distance annotation.
    #[must_use]
    pub fn assess(record: MetricRecord) -> Self {
        let assessment = quality::assess(&record.measurements);
        Self {
            record,
            distance_m: None,
            quality_score: assessment.score,
            status: assessment.status,
        }
    }

    /// Score a record and annotate its distance from the query origin.
    #[must_use]
    pub fn at_distance(record: MetricRecord, meters: f64) -> Self {
        Self {
            distance_m: Some(round_hundredths(meters)),
            ..Self::assess(record)
        }
    }

    /// Access point the candidate describes.
    #[must_use]
    pub const fn access_point(&self) -> &AccessPoint {
        &self.record.access_point
    }
}
