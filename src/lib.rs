//! Facade crate for the wifiscout access point advisor.
//!
//! This crate re-exports the core scoring and recommendation types and
//! exposes the SQLite store, telemetry collection and reporting behind
//! feature flags.

#![forbid(unsafe_code)]

pub use wifiscout_core::{
    AccessPoint, Advice, AdviceTarget, Advisor, AdvisorConfig, AdvisorError, Assessment,
    GeoPoint, InputError, Measurements, MemoryMetricStore, MetricRecord, MetricSink, MetricStore,
    RecommendationResult, ScoredCandidate, Status, StoreError,
};

#[cfg(feature = "store-sqlite")]
pub use wifiscout_core::{SqliteMetricStore, SqliteMetricStoreError};

#[cfg(feature = "collector")]
pub use wifiscout_data::{CollectionSession, CollectorOptions, MetricSubmission, run_rounds};

#[cfg(feature = "analytics")]
pub use wifiscout_analytics::{NetworkReport, build_report};
