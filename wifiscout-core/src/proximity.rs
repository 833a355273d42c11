//! Geospatial selection over a snapshot of latest located metrics.
//!
//! These functions never touch a store. The advisor takes one snapshot and
//! feeds it to both selections so a single recommendation cannot observe
//! two different states of the data.

use std::cmp::Ordering;

use log::debug;

use crate::{GeoPoint, MetricRecord, ScoredCandidate};

/// Candidates within `radius_m` meters of `origin`, best first.
///
/// Records without a location are ignored. The boundary is inclusive.
/// Ordering is by score descending, then distance ascending, then access
/// point name ascending, so equal inputs always produce equal output.
#[must_use]
pub fn nearby_candidates(
    snapshot: &[MetricRecord],
    origin: &GeoPoint,
    radius_m: f64,
) -> Vec<ScoredCandidate> {
    let mut candidates: Vec<ScoredCandidate> = snapshot
        .iter()
        .filter_map(|record| {
            let location = record.access_point.location?;
            let meters = origin.haversine_distance(&location);
            (meters <= radius_m).then(|| ScoredCandidate::at_distance(record.clone(), meters))
        })
        .collect();
    candidates.sort_by(rank);
    debug!(
        "{} of {} located access points within {radius_m} m",
        candidates.len(),
        snapshot.len()
    );
    candidates
}

fn rank(left: &ScoredCandidate, right: &ScoredCandidate) -> Ordering {
    right
        .quality_score
        .total_cmp(&left.quality_score)
        .then_with(|| {
            let left_distance = left.distance_m.unwrap_or(f64::INFINITY);
            let right_distance = right.distance_m.unwrap_or(f64::INFINITY);
            left_distance.total_cmp(&right_distance)
        })
        .then_with(|| left.access_point().name.cmp(&right.access_point().name))
}

/// The located record nearest to `origin` by `|Δlat| + |Δlon|` in degrees.
///
/// The first record wins ties, so callers passing records in store order get
/// the lowest identifier.
#[must_use]
pub fn crude_nearest<'a>(records: &'a [MetricRecord], origin: &GeoPoint) -> Option<&'a MetricRecord> {
    records
        .iter()
        .filter_map(|record| {
            record
                .access_point
                .location
                .map(|location| (record, origin.degree_manhattan_distance(&location)))
        })
        .fold(None, |best: Option<(&MetricRecord, f64)>, (record, key)| match best {
            Some((_, best_key)) if best_key <= key => best,
            _ => Some((record, key)),
        })
        .map(|(record, _)| record)
}

/// Keep `nearest` only when it lies within `radius_m` great-circle meters.
///
/// The crude ranking picks the record; the haversine distance decides
/// whether the user is really there.
#[must_use]
pub fn confirm_current(
    nearest: Option<MetricRecord>,
    origin: &GeoPoint,
    radius_m: f64,
) -> Option<ScoredCandidate> {
    let record = nearest?;
    let location = record.access_point.location?;
    let meters = origin.haversine_distance(&location);
    if meters <= radius_m {
        Some(ScoredCandidate::at_distance(record, meters))
    } else {
        debug!(
            "nearest access point {} is {meters:.2} m away, beyond {radius_m} m",
            record.access_point.name
        );
        None
    }
}

/// Resolve the access point the user is currently at from a snapshot.
#[must_use]
pub fn resolve_current(
    snapshot: &[MetricRecord],
    origin: &GeoPoint,
    radius_m: f64,
) -> Option<ScoredCandidate> {
    confirm_current(crude_nearest(snapshot, origin).cloned(), origin, radius_m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccessPoint, Measurements};
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint::new(latitude, longitude).expect("valid test coordinates")
    }

    fn record(id: u64, name: &str, location: GeoPoint, download: f64) -> MetricRecord {
        MetricRecord::new(
            AccessPoint::new(name).with_id(id).at(location),
            Measurements {
                download_mbps: Some(download),
                ..Measurements::default()
            },
            Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
        )
    }

    #[fixture]
    fn origin() -> GeoPoint {
        point(0.0, 0.0)
    }

    #[rstest]
    #[case(1001.0, 1)]
    #[case(1000.0, 0)]
    fn radius_boundary_follows_great_circle_distance(
        origin: GeoPoint,
        #[case] radius: f64,
        #[case] expected: usize,
    ) {
        let snapshot = vec![record(1, "EAST", point(0.0, 0.009), 50.0)];
        assert_eq!(nearby_candidates(&snapshot, &origin, radius).len(), expected);
    }

    #[rstest]
    #[case(1000.0, 1)]
    #[case(999.0, 0)]
    fn point_just_inside_one_kilometre(
        origin: GeoPoint,
        #[case] radius: f64,
        #[case] expected: usize,
    ) {
        let snapshot = vec![record(1, "EAST", point(0.0, 0.008_99), 50.0)];
        assert_eq!(nearby_candidates(&snapshot, &origin, radius).len(), expected);
    }

    #[rstest]
    fn zero_radius_keeps_only_colocated_points(origin: GeoPoint) {
        let snapshot = vec![
            record(1, "HERE", origin, 10.0),
            record(2, "NEAR", point(0.0, 0.000_01), 90.0),
        ];
        let found = nearby_candidates(&snapshot, &origin, 0.0);
        assert_eq!(found.len(), 1);
        assert_eq!(found.first().map(|c| c.distance_m), Some(Some(0.0)));
    }

    #[rstest]
    fn unlocated_records_are_ignored(origin: GeoPoint) {
        let unlocated = MetricRecord::new(
            AccessPoint::new("NOWHERE").with_id(9),
            Measurements::default(),
            Utc::now(),
        );
        assert!(nearby_candidates(&[unlocated.clone()], &origin, 10_000.0).is_empty());
        assert!(crude_nearest(&[unlocated], &origin).is_none());
    }

    #[rstest]
    fn ties_break_by_distance_then_name(origin: GeoPoint) {
        let snapshot = vec![
            record(1, "B_FAR", point(0.0, 0.002), 50.0),
            record(2, "C_NEAR", point(0.0, 0.001), 50.0),
            record(3, "A_NEAR", point(0.0, -0.001), 50.0),
            record(4, "BEST", point(0.0, 0.003), 90.0),
        ];
        let names: Vec<_> = nearby_candidates(&snapshot, &origin, 1000.0)
            .into_iter()
            .map(|candidate| candidate.record.access_point.name)
            .collect();
        assert_eq!(names, vec!["BEST", "A_NEAR", "C_NEAR", "B_FAR"]);
    }

    #[rstest]
    fn crude_ties_keep_store_order(origin: GeoPoint) {
        let snapshot = vec![
            record(1, "NORTH", point(0.001, 0.0), 10.0),
            record(2, "EAST", point(0.0, 0.001), 90.0),
        ];
        let nearest = crude_nearest(&snapshot, &origin).map(|r| r.access_point.id);
        assert_eq!(nearest, Some(Some(1)));
    }

    #[rstest]
    #[case(50.0, None)]
    #[case(60.0, Some("NORTH"))]
    fn crude_pick_stands_when_great_circle_disagrees(
        #[case] radius: f64,
        #[case] expected: Option<&str>,
    ) {
        // At 60 degrees north a degree of longitude spans half the meters of
        // a degree of latitude. NORTH is about 55.6 m away and EAST about
        // 33.4 m, yet NORTH has the smaller degree sum.
        let user = point(60.0, 10.0);
        let snapshot = vec![
            record(1, "NORTH", point(60.000_5, 10.0), 50.0),
            record(2, "EAST", point(60.0, 10.000_6), 50.0),
        ];
        let crude = crude_nearest(&snapshot, &user).map(|r| r.access_point.name.as_str());
        assert_eq!(crude, Some("NORTH"));

        let current = resolve_current(&snapshot, &user, radius);
        assert_eq!(
            current.as_ref().map(|c| c.access_point().name.as_str()),
            expected
        );
    }

    #[rstest]
    #[case(50.0, true)]
    #[case(20.0, false)]
    fn current_location_requires_confirmation(
        origin: GeoPoint,
        #[case] radius: f64,
        #[case] expect_found: bool,
    ) {
        // 0.0003 degrees of longitude at the equator is about 33 m.
        let snapshot = vec![record(1, "LOBBY", point(0.0, 0.000_3), 40.0)];
        assert_eq!(resolve_current(&snapshot, &origin, radius).is_some(), expect_found);
    }
}
