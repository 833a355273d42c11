//! Telemetry ingestion for the wifiscout engine.
//!
//! Responsibilities:
//! - Decode and validate submissions posted by field collectors.
//! - Describe the demonstration campus fleet.
//! - Simulate collection, either as a bounded backfill or as a live
//!   background session.
//!
//! Boundaries:
//! - Scoring and geospatial rules live in `wifiscout-core`.
//! - Persistence goes through the core `MetricSink` trait.
//!
//! Invariants:
//! - No global mutable state; a running collector is owned by its
//!   [`CollectionSession`] handle.

mod collector;
mod error;
mod fleet;
mod submission;

pub use collector::{
    CollectionSession, CollectorOptions, DEFAULT_INTERVAL, DEFAULT_SEED, RoundsOptions,
    SimulatedProbe, run_rounds,
};
pub use error::{CollectorError, SubmissionError};
pub use fleet::{CAMPUS, FleetEntry, build_fleet, campus_fleet};
pub use submission::{MetricSubmission, parse_submissions};
