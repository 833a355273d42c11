//! Behavioural coverage for submission ingestion and simulated collection.

use std::cell::RefCell;

use chrono::{TimeDelta, TimeZone, Utc};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use wifiscout_core::{MemoryMetricStore, MetricRecord, MetricSink};
use wifiscout_data::{
    CAMPUS, RoundsOptions, SubmissionError, campus_fleet, parse_submissions, run_rounds,
};

/// Shared state for ingestion scenarios.
struct IngestWorld {
    store: RefCell<Option<MemoryMetricStore>>,
    failure: RefCell<Option<SubmissionError>>,
}

#[fixture]
fn world() -> IngestWorld {
    IngestWorld {
        store: RefCell::new(None),
        failure: RefCell::new(None),
    }
}

fn latest_snapshots(world: &IngestWorld) -> Vec<MetricRecord> {
    let guard = world.store.borrow();
    guard
        .as_ref()
        .expect("store should be initialised")
        .latest_metrics()
        .expect("latest metrics")
}

fn ingest(world: &IngestWorld, payload: &str) {
    let received_at = Utc
        .with_ymd_and_hms(2025, 8, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    let guard = world.store.borrow();
    let sink = guard.as_ref().expect("store should be initialised");
    let outcome = parse_submissions(payload).and_then(|submissions| {
        submissions
            .into_iter()
            .map(|submission| submission.into_record(received_at))
            .collect::<Result<Vec<_>, _>>()
    });
    match outcome {
        Ok(records) => {
            for record in &records {
                sink.record(record).expect("record submission");
            }
        }
        Err(err) => {
            world.failure.replace(Some(err));
        }
    }
}

#[given("an empty metric store")]
fn empty_store(world: &IngestWorld) {
    world.store.replace(Some(MemoryMetricStore::default()));
}

#[when("I ingest a payload with two snapshots for the food street access point")]
fn ingest_two(world: &IngestWorld) {
    ingest(
        world,
        r#"[
            {"ap_name": "FOOD_STREET_01", "building": "Food Street", "floor": 1,
             "latitude": 40.7140, "longitude": -74.0090, "download_speed": 30.0,
             "timestamp": "2025-08-01T08:00:00Z"},
            {"ap_name": "FOOD_STREET_01", "building": "Food Street", "floor": 1,
             "latitude": 40.7140, "longitude": -74.0090, "download_speed": 55.0,
             "timestamp": "2025-08-01T08:30:00Z"}
        ]"#,
    );
}

#[when("I ingest a payload with a latitude but no longitude")]
fn ingest_partial(world: &IngestWorld) {
    ingest(
        world,
        r#"{"ap_name": "ROCK_PLAZA_01", "latitude": 40.7150}"#,
    );
}

#[when("I simulate two rounds over the campus")]
fn simulate(world: &IngestWorld) {
    let fleet = campus_fleet().expect("valid campus");
    let guard = world.store.borrow();
    let sink = guard.as_ref().expect("store should be initialised");
    let options = RoundsOptions {
        rounds: 2,
        seed: 11,
        end: Utc::now(),
        step: TimeDelta::seconds(2),
    };
    let written = run_rounds(sink, &fleet, options).expect("simulate rounds");
    assert_eq!(written, 2 * CAMPUS.len() as u64);
}

#[then("the store holds one access point")]
fn holds_one(world: &IngestWorld) {
    let latest = latest_snapshots(world);
    assert_eq!(latest.len(), 1);
}

#[then("its latest snapshot is the later one")]
fn latest_is_later(world: &IngestWorld) {
    let latest = latest_snapshots(world);
    assert_eq!(
        latest.first().and_then(|r| r.measurements.download_mbps),
        Some(55.0)
    );
}

#[then("the submission is rejected for a partial location")]
fn rejected_partial(world: &IngestWorld) {
    assert!(matches!(
        world.failure.borrow().as_ref(),
        Some(SubmissionError::PartialLocation { .. })
    ));
}

#[then("the store holds no access points")]
fn holds_none(world: &IngestWorld) {
    let latest = latest_snapshots(world);
    assert!(latest.is_empty());
}

#[then("every campus access point has a latest snapshot")]
fn campus_covered(world: &IngestWorld) {
    let latest = latest_snapshots(world);
    assert_eq!(latest.len(), CAMPUS.len());
}

#[scenario(path = "tests/features/ingest_submissions.feature", index = 0)]
fn payload_array_registers_once(world: IngestWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/ingest_submissions.feature", index = 1)]
fn partial_location_rejected(world: IngestWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/ingest_submissions.feature", index = 2)]
fn simulated_rounds_cover_campus(world: IngestWorld) {
    let _ = world;
}
