//! Configuration resolution: defaults, required options and layering.

use super::*;
use camino::Utf8PathBuf;
use chrono::TimeDelta;
use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::json;
use wifiscout_core::{
    DEFAULT_CURRENT_RADIUS_M, DEFAULT_RECOMMENDATION_LIMIT, DEFAULT_SEARCH_RADIUS_M,
};

fn expect_missing(err: CliError, expected_field: &str, expected_env: &str) {
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, expected_field);
            assert_eq!(env, expected_env);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case(None, Some(-74.0), ARG_LATITUDE, ENV_NEARBY_LATITUDE)]
#[case(Some(40.7), None, ARG_LONGITUDE, ENV_NEARBY_LONGITUDE)]
fn nearby_requires_both_coordinates(
    #[case] latitude: Option<f64>,
    #[case] longitude: Option<f64>,
    #[case] field: &str,
    #[case] env: &str,
) {
    let args = query::NearbyArgs {
        latitude,
        longitude,
        ..query::NearbyArgs::default()
    };
    let err = query::PositionConfig::try_from(args).expect_err("missing coordinate");
    expect_missing(err, field, env);
}

#[rstest]
fn position_queries_apply_their_own_default_radius() {
    let nearby = query::PositionConfig::try_from(query::NearbyArgs {
        latitude: Some(1.0),
        longitude: Some(2.0),
        ..query::NearbyArgs::default()
    })
    .expect("nearby config");
    assert_eq!(nearby.radius_m, DEFAULT_SEARCH_RADIUS_M);
    assert_eq!(nearby.database, Utf8PathBuf::from(DEFAULT_DATABASE));

    let current = query::PositionConfig::try_from(query::CurrentArgs {
        latitude: Some(1.0),
        longitude: Some(2.0),
        ..query::CurrentArgs::default()
    })
    .expect("current config");
    assert_eq!(current.radius_m, DEFAULT_CURRENT_RADIUS_M);
}

#[rstest]
fn recommend_defaults_fill_the_advisor() {
    let config = query::RecommendConfig::try_from(query::RecommendArgs {
        latitude: Some(40.7128),
        longitude: Some(-74.0060),
        limit: Some(3),
        ..query::RecommendArgs::default()
    })
    .expect("recommend config");
    assert_eq!(config.advisor.recommendation_limit, 3);
    assert_eq!(config.advisor.search_radius_m, DEFAULT_SEARCH_RADIUS_M);
    assert_eq!(config.advisor.current_radius_m, DEFAULT_CURRENT_RADIUS_M);
}

#[rstest]
fn trend_requires_an_access_point() {
    let err = query::TrendConfig::try_from(query::TrendArgs::default()).expect_err("no id");
    expect_missing(err, ARG_ACCESS_POINT, ENV_TREND_ACCESS_POINT);
}

#[rstest]
fn show_requires_an_access_point() {
    let err = query::ShowConfig::try_from(query::ShowArgs::default()).expect_err("no id");
    expect_missing(err, ARG_ACCESS_POINT, ENV_SHOW_ACCESS_POINT);
}

#[rstest]
fn show_parses_its_identifier() {
    let cli = Cli::try_parse_from(["wifiscout", "show", "--access-point", "3"])
        .expect("arguments should parse");
    match cli.command {
        Command::Show(args) => {
            let config = query::ShowConfig::try_from(args).expect("show config");
            assert_eq!(config.access_point, 3);
            assert_eq!(config.database, Utf8PathBuf::from(DEFAULT_DATABASE));
        }
        other => panic!("expected show, found {other:?}"),
    }
}

#[rstest]
fn trend_window_defaults_to_a_day() {
    let config = query::TrendConfig::try_from(query::TrendArgs {
        access_point: Some(7),
        ..query::TrendArgs::default()
    })
    .expect("trend config");
    assert_eq!(config.window, TimeDelta::hours(24));
}

#[rstest]
fn submit_requires_a_payload() {
    let err = ingest::SubmitConfig::try_from(ingest::SubmitArgs::default()).expect_err("no path");
    expect_missing(err, ARG_PAYLOAD, ENV_SUBMIT_PAYLOAD);
}

#[rstest]
fn simulate_and_report_have_complete_defaults() {
    let simulate = ingest::SimulateConfig::from(ingest::SimulateArgs::default());
    assert_eq!(simulate.rounds, ingest::DEFAULT_SIMULATION_ROUNDS);
    assert_eq!(simulate.seed, wifiscout_data::DEFAULT_SEED);

    let report = report::ReportConfig::from(report::ReportArgs::default());
    assert_eq!(report.window, TimeDelta::days(7));
    assert_eq!(report.top, report::DEFAULT_REPORT_TOP);
}

#[rstest]
fn recommend_layers_honour_precedence() {
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "database": "from-file.db",
            "latitude": 10.0,
            "longitude": 20.0,
            "limit": 2,
        }),
        None,
    );
    composer.push_environment(json!({ "latitude": 11.0 }));
    composer.push_cli(json!({ "latitude": 12.0 }));

    let merged =
        query::RecommendArgs::merge_from_layers(composer.layers()).expect("layers should merge");
    let config = query::RecommendConfig::try_from(merged).expect("recommend config");
    assert_eq!(config.latitude, 12.0);
    assert_eq!(config.longitude, 20.0);
    assert_eq!(config.advisor.recommendation_limit, 2);
    assert_eq!(config.database, Utf8PathBuf::from("from-file.db"));
}

#[rstest]
fn invalid_layers_map_to_configuration_errors() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "latitude": "north" }));
    let err = query::NearbyArgs::merge_from_layers(composer.layers())
        .map_err(CliError::from)
        .expect_err("invalid layer");
    assert!(matches!(err, CliError::Configuration(_)));
}

#[rstest]
fn negative_coordinates_parse_as_values() {
    let cli = Cli::try_parse_from([
        "wifiscout",
        "recommend",
        "--latitude",
        "-33.8688",
        "--longitude",
        "151.2093",
        "--current-radius",
        "25",
    ])
    .expect("arguments should parse");
    match cli.command {
        Command::Recommend(args) => {
            assert_eq!(args.latitude, Some(-33.8688));
            assert_eq!(args.current_radius, Some(25.0));
        }
        other => panic!("expected recommend, found {other:?}"),
    }
}
