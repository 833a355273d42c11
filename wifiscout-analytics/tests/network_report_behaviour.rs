//! Behavioural coverage for network report assembly.

use std::cell::RefCell;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use wifiscout_analytics::{CongestionLevel, NetworkReport, build_report};
use wifiscout_core::{AccessPoint, Measurements, MetricRecord};

/// Shared state for report scenarios.
struct ReportWorld {
    records: RefCell<Vec<MetricRecord>>,
    report: RefCell<Option<NetworkReport>>,
}

#[fixture]
fn world() -> ReportWorld {
    ReportWorld {
        records: RefCell::new(Vec::new()),
        report: RefCell::new(None),
    }
}

fn window_end() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 9, 17, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn snapshot(
    name: &str,
    building: &str,
    download: f64,
    users: u32,
    at: DateTime<Utc>,
) -> MetricRecord {
    MetricRecord::new(
        AccessPoint::new(name).in_building(building, 1),
        Measurements {
            download_mbps: Some(download),
            upload_mbps: Some(download / 2.0),
            latency: Some(Duration::from_millis(40)),
            connected_users: Some(users),
            signal_dbm: Some(-60.0),
            ..Measurements::default()
        },
        at,
    )
}

fn with_report<T>(world: &ReportWorld, check: impl FnOnce(&NetworkReport) -> T) -> T {
    let guard = world.report.borrow();
    check(guard.as_ref().expect("report should be built"))
}

#[given("a week of telemetry from three library and one cafeteria access point")]
fn campus_week(world: &ReportWorld) {
    let end = window_end();
    let earlier = end - TimeDelta::days(6);
    world.records.replace(vec![
        snapshot("LIBRARY_AP_01", "Library", 20.0, 4, earlier),
        snapshot("LIBRARY_AP_01", "Library", 95.0, 3, end),
        snapshot("LIBRARY_AP_02", "Library", 60.0, 12, end),
        snapshot("LIBRARY_AP_03", "Library", 40.0, 20, end),
        snapshot("CAFETERIA_AP_01", "Cafeteria", 10.0, 48, end),
    ]);
}

#[given("no telemetry")]
fn no_telemetry(world: &ReportWorld) {
    world.records.replace(Vec::new());
}

#[when("I build a report with the top two access points")]
fn build(world: &ReportWorld) {
    let report = build_report(&world.records.borrow(), 2);
    world.report.replace(Some(report));
}

#[then("the report counts every snapshot")]
fn counts_snapshots(world: &ReportWorld) {
    with_report(world, |report| {
        assert_eq!(report.total_records, 5);
        let range = report.date_range.expect("date range");
        assert_eq!(range.end, window_end());
        assert_eq!(range.start, window_end() - TimeDelta::days(6));
    });
}

#[then("the fastest library access point ranks first")]
fn fastest_first(world: &ReportWorld) {
    with_report(world, |report| {
        let best: Vec<_> = report
            .top_performers
            .iter()
            .map(|p| p.ap_name.as_str())
            .collect();
        assert_eq!(best, ["LIBRARY_AP_01", "LIBRARY_AP_02"]);
        assert_eq!(
            report.worst_performers.first().map(|p| p.ap_name.as_str()),
            Some("CAFETERIA_AP_01")
        );
    });
}

#[then("the library statistics cover three access points")]
fn library_statistics(world: &ReportWorld) {
    with_report(world, |report| {
        let library = report.buildings.get("Library").expect("library stats");
        assert_eq!(library.access_points, 3);
        assert_eq!(library.mean_download_speed, Some(65.0));
        assert!(library.quality_score_std_dev.is_some());
        let cafeteria = report.buildings.get("Cafeteria").expect("cafeteria stats");
        assert_eq!(cafeteria.quality_score_std_dev, None);
    });
}

#[then("one access point is severely congested")]
fn severe_congestion(world: &ReportWorld) {
    with_report(world, |report| {
        assert_eq!(report.congestion.get(&CongestionLevel::Severe), Some(&1));
        assert_eq!(report.congestion.get(&CongestionLevel::Low), Some(&1));
        assert_eq!(report.congestion.values().sum::<usize>(), 4);
    });
}

#[then("the report is empty")]
fn empty_report(world: &ReportWorld) {
    with_report(world, |report| {
        assert!(report.is_empty());
        assert!(report.overall.is_none());
        assert!(report.top_performers.is_empty());
    });
}

#[scenario(path = "tests/features/network_report.feature", index = 0)]
fn reporting_over_a_campus_window(world: ReportWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/network_report.feature", index = 1)]
fn reporting_over_an_empty_window(world: ReportWorld) {
    let _ = world;
}
