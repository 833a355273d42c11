//! Core engine for scoring Wi-Fi access points and recommending better
//! ones nearby.
//!
//! The crate is organised bottom-up:
//!
//! - [`GeoPoint`], [`AccessPoint`], [`Measurements`] and [`MetricRecord`]
//!   model the telemetry.
//! - [`quality`] turns telemetry into a score and a [`Status`] band.
//! - [`MetricStore`] and [`MetricSink`] abstract persistence; the
//!   [`MemoryMetricStore`] and, with the `store-sqlite` feature,
//!   [`SqliteMetricStore`] implement both.
//! - [`Advisor`] answers queries: nearby search, current location,
//!   recommendations with [`Advice`], and score trends.
//!
//! Constructors validate input and return `Result` so that invalid
//! coordinates or radii surface before any store is consulted.

mod access_point;
mod advice;
mod advisor;
mod candidate;
mod error;
pub mod fs;
mod location;
pub mod metric;
pub mod proximity;
pub mod quality;
pub mod store;

pub use access_point::AccessPoint;
pub use advice::{Advice, AdviceTarget};
pub use advisor::{
    Advisor, AdvisorConfig, DEFAULT_CURRENT_RADIUS_M, DEFAULT_RECOMMENDATION_LIMIT,
    DEFAULT_SEARCH_RADIUS_M, RecommendationResult,
};
pub use candidate::ScoredCandidate;
pub use error::{AdvisorError, InputError, StoreError};
pub use location::{CoordinateError, EARTH_RADIUS_M, GeoPoint};
pub use metric::{LatencyError, Measurements, MetricRecord};
pub use quality::{Assessment, Status};
pub use store::{MemoryMetricStore, MetricSink, MetricStore};
#[cfg(feature = "store-sqlite")]
pub use store::{MetricsSchemaError, SqliteMetricStore, SqliteMetricStoreError};
